use crate::math::Real;

/// cos(π/8), the face-alignment threshold above which two contact features
/// are treated as a conformal face-face contact.
pub(crate) const COS_FRAC_PI_8: Real = 0.923_879_5;
