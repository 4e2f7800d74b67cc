//! Individual distance samples.

/// Which query produced a distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleTag {
    /// A point sampled on mesh A, measured against mesh B.
    AToB,
    /// A point sampled on mesh B, measured against mesh A.
    BToA,
    /// A point sampled on the compared mesh, measured against the reference.
    CloudToMesh,
    /// Placeholder for a comparison that could not run.
    Error,
}

impl SampleTag {
    /// Label written to distance tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AToB => "mesh1_to_mesh2",
            Self::BToA => "mesh2_to_mesh1",
            Self::CloudToMesh => "mesh2_to_mesh1_surface",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for SampleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One measured distance.
///
/// Cloud-to-cloud distances are non-negative; cloud-to-mesh distances carry
/// a sign.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceSample {
    /// Distance value.
    pub distance: f64,
    /// Provenance.
    pub tag: SampleTag,
}

impl DistanceSample {
    /// A sample with `distance` and `tag`.
    #[must_use]
    pub const fn new(distance: f64, tag: SampleTag) -> Self {
        Self { distance, tag }
    }

    /// The zero-distance placeholder used when a comparison fails.
    #[must_use]
    pub const fn sentinel() -> Self {
        Self::new(0.0, SampleTag::Error)
    }
}
