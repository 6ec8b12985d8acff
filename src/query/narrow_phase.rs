//! Narrow-phase orchestration: collider-pair dispatch, contact generation
//! and manifold persistence.

use crate::math::{Isometry, Point, Real, Vector};
use crate::query::clip::clip_polygon_against_plane;
use crate::query::epa::{EpaDetector, Penetration};
use crate::query::gjk::GjkDetector;
use crate::query::{Contact, Manifold, MAX_CONTACTS};
use crate::shape::{Collider, ConcaveCollider, ConvexCollider};
use crate::utils;
use arrayvec::ArrayVec;
use num::Bounded;
use smallvec::SmallVec;

/// The fine collision detector.
///
/// Dispatches over the convexity classes of a collider pair, runs GJK/EPA on
/// the convex leaves, generates one or more contact points per intersecting
/// pair, and folds them into the pair's persistent [`Manifold`].
#[derive(Debug, Clone)]
pub struct NarrowPhase {
    gjk: GjkDetector,
    epa: EpaDetector,
    // Two contacts closer than this are considered the same contact.
    contact_separation: Real,
}

impl NarrowPhase {
    /// Creates a narrow phase.
    ///
    /// `min_face_difference` is the EPA termination threshold,
    /// `contact_precision` the numeric tolerance shared by GJK and EPA, and
    /// `contact_separation` the distance under which two contact points are
    /// merged into one.
    pub fn new(
        min_face_difference: Real,
        contact_precision: Real,
        contact_separation: Real,
    ) -> Self {
        NarrowPhase {
            gjk: GjkDetector::new(contact_precision),
            epa: EpaDetector::new(min_face_difference, contact_precision),
            contact_separation,
        }
    }

    /// Tests one collider pair and updates its manifold in place.
    ///
    /// Returns `true` if the colliders are intersecting. On `false` the
    /// manifold is emptied. The collider order must match the order used for
    /// this manifold on previous frames: contact normals point from
    /// `collider1` toward `collider2`.
    pub fn collide(
        &self,
        collider1: &Collider,
        collider2: &Collider,
        manifold: &mut Manifold,
    ) -> bool {
        let mut candidates = Vec::new();

        match (collider1, collider2) {
            (Collider::Convex(c1), Collider::Convex(c2)) => {
                self.accumulate_convex_contacts(c1, c2, false, &mut candidates);
            }
            (Collider::Convex(convex), Collider::Concave(concave)) => {
                self.accumulate_concave_contacts(convex, concave, false, &mut candidates);
            }
            (Collider::Concave(concave), Collider::Convex(convex)) => {
                self.accumulate_concave_contacts(convex, concave, true, &mut candidates);
            }
            (Collider::Concave(c1), Collider::Concave(c2)) => {
                for part in c1.parts() {
                    self.accumulate_concave_contacts(part, c2, false, &mut candidates);
                }
            }
        }

        self.update_manifold(collider1.pose(), collider2.pose(), candidates, manifold)
    }

    // Convex vs. convex leaf case: GJK, then EPA, then the multi-point
    // contact generation. `flipped` tells whether the pair order is the
    // reverse of the manifold order.
    fn accumulate_convex_contacts(
        &self,
        c1: &ConvexCollider,
        c2: &ConvexCollider,
        flipped: bool,
        out: &mut Vec<Contact>,
    ) {
        let Some(simplex) = self.gjk.intersection(c1, c2) else {
            return;
        };
        let Some(penetration) = self.epa.penetration(c1, c2, &simplex) else {
            return;
        };

        let mut contacts = self.clipped_contacts(c1, c2, &penetration);
        if contacts.is_empty() {
            contacts.push(self.single_contact(c1, c2, &penetration));
        }

        for contact in contacts {
            out.push(if flipped { contact.flipped() } else { contact });
        }
    }

    // Convex vs. concave: prune the concave side's parts with the convex
    // side's bounding box and recurse into the convex leaf case. Contacts
    // against different parts aggregate into the same candidate list.
    fn accumulate_concave_contacts(
        &self,
        convex: &ConvexCollider,
        concave: &ConcaveCollider,
        concave_first: bool,
        out: &mut Vec<Contact>,
    ) {
        for part in concave.overlapping_parts(convex.aabb()) {
            self.accumulate_convex_contacts(convex, part, concave_first, out);
        }
    }

    fn single_contact(
        &self,
        c1: &ConvexCollider,
        c2: &ConvexCollider,
        penetration: &Penetration,
    ) -> Contact {
        Contact {
            local1: c1.pose().inverse_transform_point(&penetration.world1),
            local2: c2.pose().inverse_transform_point(&penetration.world2),
            world1: penetration.world1,
            world2: penetration.world2,
            normal: penetration.normal,
            depth: penetration.depth,
            feature1: penetration.feature1,
            feature2: penetration.feature2,
        }
    }

    // Face-face contacts: clip the incident face of `c2` against the side
    // planes of the reference face of `c1` and keep the points penetrating
    // the reference plane. Degenerate or non-conformal configurations yield
    // an empty list and the caller falls back to the single deepest point.
    fn clipped_contacts(
        &self,
        c1: &ConvexCollider,
        c2: &ConvexCollider,
        penetration: &Penetration,
    ) -> Vec<Contact> {
        let normal = penetration.normal;

        let Some((reference, ref_alignment)) = best_aligned_face(c1, &normal.into_inner()) else {
            return Vec::new();
        };
        let Some((incident, _)) = best_aligned_face(c2, &(-normal.into_inner())) else {
            return Vec::new();
        };

        // Only conformal face-face configurations produce a stable patch of
        // contacts; anything else is an edge or vertex touch.
        if ref_alignment < utils::COS_FRAC_PI_8 {
            return Vec::new();
        }

        let ref_normal = c1.world_face_normal(reference);
        let ref_vertices: SmallVec<[Point<Real>; 8]> = c1
            .mesh()
            .face_vertices(reference)
            .iter()
            .map(|&v| c1.world_vertex(v))
            .collect();

        let mut polygon: SmallVec<[Point<Real>; 8]> = c2
            .mesh()
            .face_vertices(incident)
            .iter()
            .map(|&v| c2.world_vertex(v))
            .collect();

        for (i, p1) in ref_vertices.iter().enumerate() {
            let p2 = &ref_vertices[(i + 1) % ref_vertices.len()];
            let side_normal = (p2 - p1).cross(&ref_normal);
            polygon = clip_polygon_against_plane(&polygon, p1, &side_normal);
            if polygon.is_empty() {
                return Vec::new();
            }
        }

        let ref_point = ref_vertices[0];
        let mut contacts = Vec::new();

        for point in polygon {
            let separation = (point - ref_point).dot(&ref_normal);
            if separation > self.contact_separation {
                continue;
            }

            let depth = -separation;
            let world1 = point - ref_normal * separation;
            let world2 = point;

            contacts.push(Contact {
                local1: c1.pose().inverse_transform_point(&world1),
                local2: c2.pose().inverse_transform_point(&world2),
                world1,
                world2,
                normal,
                depth,
                feature1: reference,
                feature2: incident,
            });
        }

        contacts
    }

    // Refreshes the persisted contacts, merges the new candidates by
    // proximity, and reduces the result back to the manifold capacity.
    fn update_manifold(
        &self,
        pose1: &Isometry<Real>,
        pose2: &Isometry<Real>,
        candidates: Vec<Contact>,
        manifold: &mut Manifold,
    ) -> bool {
        self.remove_invalid_contacts(pose1, pose2, manifold);

        if candidates.is_empty() {
            let had_contacts = !manifold.contacts.is_empty();
            manifold.contacts.clear();
            manifold.set_updated(had_contacts);
            return false;
        }

        let mut all: Vec<Contact> = manifold.contacts.drain(..).collect();

        for candidate in candidates {
            if let Some(slot) = all.iter().position(|old| self.is_close(old, &candidate)) {
                // Same contact as an older one: refresh it in place so the
                // solver keeps its warm-start data for this slot.
                all[slot] = candidate;
            } else {
                all.push(candidate);
            }
        }

        manifold.contacts = self.limit_contacts(all);
        manifold.set_updated(true);
        true
    }

    /// Drops persisted contacts that no longer describe the current
    /// configuration: separated along the normal, or drifted tangentially
    /// beyond the contact separation. Survivors get their world-space data
    /// refreshed from the current poses.
    fn remove_invalid_contacts(
        &self,
        pose1: &Isometry<Real>,
        pose2: &Isometry<Real>,
        manifold: &mut Manifold,
    ) {
        let separation = self.contact_separation;

        manifold.contacts.retain(|contact| {
            let world1 = pose1 * contact.local1;
            let world2 = pose2 * contact.local2;
            let delta = world1 - world2;
            let depth = delta.dot(&contact.normal);
            let tangent = delta - contact.normal.into_inner() * depth;

            if depth < -separation || tangent.norm_squared() > separation * separation {
                return false;
            }

            contact.world1 = world1;
            contact.world2 = world2;
            contact.depth = depth;
            true
        });
    }

    // Two contacts are the same if both of their world positions lie within
    // the contact separation distance.
    fn is_close(&self, a: &Contact, b: &Contact) -> bool {
        na::distance(&a.world1, &b.world1) < self.contact_separation
            && na::distance(&a.world2, &b.world2) < self.contact_separation
    }

    // Keeps the deepest contact, then greedily the contacts furthest away
    // from everything already kept. Deterministic given the input order:
    // ties keep the earliest candidate.
    fn limit_contacts(&self, mut all: Vec<Contact>) -> ArrayVec<Contact, MAX_CONTACTS> {
        let mut kept = ArrayVec::new();

        if all.len() <= MAX_CONTACTS {
            kept.extend(all);
            return kept;
        }

        let mut deepest = 0;
        for (i, contact) in all.iter().enumerate() {
            if contact.depth > all[deepest].depth {
                deepest = i;
            }
        }
        kept.push(all.swap_remove(deepest));

        while kept.len() < MAX_CONTACTS {
            let mut furthest = 0;
            let mut furthest_dist = -Real::max_value();

            for (i, contact) in all.iter().enumerate() {
                let min_dist = kept
                    .iter()
                    .map(|k: &Contact| na::distance(&k.world1, &contact.world1))
                    .fold(Real::max_value(), Real::min);
                if min_dist > furthest_dist {
                    furthest = i;
                    furthest_dist = min_dist;
                }
            }

            kept.push(all.swap_remove(furthest));
        }

        kept
    }
}

// The face of `collider` whose world normal is the most aligned with `dir`,
// and the alignment value itself.
fn best_aligned_face(collider: &ConvexCollider, dir: &Vector<Real>) -> Option<(usize, Real)> {
    let mut best = None;
    let mut best_dot = -Real::max_value();

    for (&face, _) in collider.normals().iter() {
        let dot = collider.world_face_normal(face).dot(dir);
        if dot > best_dot {
            best = Some(face);
            best_dot = dot;
        }
    }

    best.map(|f| (f, best_dot))
}
