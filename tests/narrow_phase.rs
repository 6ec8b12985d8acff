mod common;

use approx::assert_relative_eq;
use common::cube_mesh;
use riposte3d::math::{Isometry, Point, Vector};
use riposte3d::query::{Manifold, NarrowPhase, MAX_CONTACTS};
use riposte3d::shape::{Collider, ConcaveCollider, ConvexCollider};

const MIN_F_DIFFERENCE: f32 = 1.0e-4;
const CONTACT_PRECISION: f32 = 1.0e-6;
const CONTACT_SEPARATION: f32 = 0.02;

fn narrow_phase() -> NarrowPhase {
    NarrowPhase::new(MIN_F_DIFFERENCE, CONTACT_PRECISION, CONTACT_SEPARATION)
}

fn convex_cube_at(x: f32, y: f32, z: f32) -> Collider {
    let mut collider = ConvexCollider::new(cube_mesh(0.5)).unwrap();
    collider.set_pose(Isometry::translation(x, y, z));
    Collider::Convex(collider)
}

// A concave "dumbbell": two unit cubes far apart on the x axis, both
// expressed in the collider's local space.
fn dumbbell() -> Collider {
    let left = ConvexCollider::new(cube_mesh(0.5)).unwrap();
    let right =
        ConvexCollider::new(common::cube_mesh_at(0.5, Point::new(4.0, 0.0, 0.0))).unwrap();

    Collider::Concave(ConcaveCollider::new(vec![left, right]).unwrap())
}

#[test]
fn face_to_face_cubes_build_a_four_point_manifold() {
    let narrow = narrow_phase();
    let c1 = convex_cube_at(0.0, 0.0, 0.0);
    let c2 = convex_cube_at(0.5, 0.0, 0.0);
    let mut manifold = Manifold::new();

    assert!(narrow.collide(&c1, &c2, &mut manifold));
    assert!(manifold.is_updated());
    assert_eq!(manifold.contacts().len(), MAX_CONTACTS);

    for contact in manifold.contacts() {
        assert_relative_eq!(contact.depth, 0.5, epsilon = 1.0e-3);
        assert_relative_eq!(contact.normal.x, 1.0, epsilon = 1.0e-3);
        // Contact anchors sit on the +x face of c1 and the -x face of c2.
        assert_relative_eq!(contact.world1.x, 0.5, epsilon = 1.0e-3);
        assert_relative_eq!(contact.world2.x, 0.0, epsilon = 1.0e-3);
    }
}

#[test]
fn manifold_never_exceeds_the_contact_cap() {
    let narrow = narrow_phase();
    let c1 = convex_cube_at(0.0, 0.0, 0.0);

    // Rotating the upper cube about the contact normal turns the clipped
    // patch into an octagon: eight candidates reduced back to four.
    let mut upper = ConvexCollider::new(cube_mesh(0.5)).unwrap();
    upper.set_pose(Isometry::new(
        Vector::new(0.0, 0.9, 0.0),
        Vector::y() * core::f32::consts::FRAC_PI_4,
    ));
    let c2 = Collider::Convex(upper);

    let mut manifold = Manifold::new();
    assert!(narrow.collide(&c1, &c2, &mut manifold));
    assert!(manifold.contacts().len() <= MAX_CONTACTS);
    assert!(manifold.contacts().len() >= 2);
}

#[test]
fn retained_contacts_stay_apart() {
    let narrow = narrow_phase();
    let c1 = convex_cube_at(0.0, 0.0, 0.0);
    let c2 = convex_cube_at(0.3, 0.2, 0.1);
    let mut manifold = Manifold::new();

    assert!(narrow.collide(&c1, &c2, &mut manifold));

    let contacts = manifold.contacts();
    for i in 0..contacts.len() {
        for j in i + 1..contacts.len() {
            let dist = (contacts[i].world1 - contacts[j].world1).norm();
            assert!(
                dist >= CONTACT_SEPARATION || contacts.len() < 2,
                "contacts {i} and {j} are only {dist} apart"
            );
        }
    }
}

#[test]
fn separated_cubes_clear_the_manifold() {
    let narrow = narrow_phase();
    let c1 = convex_cube_at(0.0, 0.0, 0.0);
    let mut manifold = Manifold::new();

    assert!(narrow.collide(&c1, &convex_cube_at(0.5, 0.0, 0.0), &mut manifold));
    assert!(!manifold.contacts().is_empty());

    // Next frame the other cube has moved far away.
    assert!(!narrow.collide(&c1, &convex_cube_at(5.0, 0.0, 0.0), &mut manifold));
    assert!(manifold.contacts().is_empty());
    assert!(manifold.is_updated());
}

#[test]
fn contacts_persist_across_small_motions() {
    let narrow = narrow_phase();
    let c1 = convex_cube_at(0.0, 0.0, 0.0);
    let mut manifold = Manifold::new();

    assert!(narrow.collide(&c1, &convex_cube_at(0.5, 0.0, 0.0), &mut manifold));
    let before: Vec<_> = manifold.contacts().to_vec();

    // A sub-separation nudge: the refreshed manifold keeps matching
    // contacts in place instead of growing.
    assert!(narrow.collide(&c1, &convex_cube_at(0.505, 0.0, 0.0), &mut manifold));
    assert_eq!(manifold.contacts().len(), before.len());

    for (old, new) in before.iter().zip(manifold.contacts()) {
        assert!((old.world1 - new.world1).norm() < CONTACT_SEPARATION);
    }
}

#[test]
fn convex_against_concave_only_hits_overlapping_parts() {
    let narrow = narrow_phase();
    let concave = dumbbell();
    let convex = convex_cube_at(0.5, 0.0, 0.0);
    let mut manifold = Manifold::new();

    // Convex first: normals point from the convex collider to the part.
    assert!(narrow.collide(&convex, &concave, &mut manifold));
    assert!(!manifold.contacts().is_empty());
    for contact in manifold.contacts() {
        assert_relative_eq!(contact.normal.x, -1.0, epsilon = 1.0e-3);
        // Only the part at the origin is touched, far from the one at x=4.
        assert!(contact.world1.x < 2.0);
    }
}

#[test]
fn concave_first_ordering_flips_the_normals() {
    let narrow = narrow_phase();
    let concave = dumbbell();
    let convex = convex_cube_at(0.5, 0.0, 0.0);
    let mut manifold = Manifold::new();

    assert!(narrow.collide(&concave, &convex, &mut manifold));
    for contact in manifold.contacts() {
        assert_relative_eq!(contact.normal.x, 1.0, epsilon = 1.0e-3);
    }
}

#[test]
fn concave_pair_collides_through_its_parts() {
    let narrow = narrow_phase();
    let c1 = dumbbell();

    let part =
        ConvexCollider::new(common::cube_mesh_at(0.5, Point::new(4.5, 0.0, 0.0))).unwrap();
    let c2 = Collider::Concave(ConcaveCollider::new(vec![part]).unwrap());

    let mut manifold = Manifold::new();
    assert!(narrow.collide(&c1, &c2, &mut manifold));

    // Only the right part of the dumbbell can reach c2.
    for contact in manifold.contacts() {
        assert!(contact.world1.x > 3.0);
    }
}

#[test]
fn missing_overlap_with_concave_returns_false() {
    let narrow = narrow_phase();
    let concave = dumbbell();
    let convex = convex_cube_at(2.0, 0.0, 0.0);
    let mut manifold = Manifold::new();

    // Right between the two parts: the AABB query prunes everything.
    assert!(!narrow.collide(&convex, &concave, &mut manifold));
    assert!(manifold.contacts().is_empty());
}
