/// Numeric cutoffs used by the flatness test and the normal evaluator.
///
/// None of these are lengths in model units except `coincident`; the
/// flatness epsilon itself is supplied per call by the subdivision driver.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tolerances {
    /// Control points closer than this are treated as the same point when
    /// looking for a chord in the flatness test.
    pub coincident: f64,

    /// Corner triangles whose normal is shorter than this are degenerate,
    /// and the corner-coplanarity test accepts the patch as flat.
    pub degenerate_plane: f64,

    /// A normal is degenerate when `|Su x Sv| <= degenerate_normal * |Su| |Sv|`
    pub degenerate_normal: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            coincident: 1e-12,
            degenerate_plane: 1e-12,
            degenerate_normal: 1e-10,
        }
    }
}
