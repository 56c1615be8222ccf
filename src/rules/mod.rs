//! Game rules on top of the board model.
//!
//! Placement validation, claim-group unions, structure tracing, marker
//! lifecycle, and the two scoring passes (incremental and final).

pub mod claims;
pub mod farms;
pub mod markers;
pub mod placement;
pub mod score;
pub mod structure;

pub use claims::{apply_placement, claim_structure, relabel_structure, Merge};
pub use farms::{
    city_farm_abutments, prepare_cities, score_farms, FarmAward, FARM_CITY_BONUS,
    MAX_ABUTTING_FARMS,
};
pub use markers::{check_marker, markers_in_play, place, release, ClaimError};
pub use placement::{
    check_placement, has_legal_placement, legal_placements, validate, PlacementError,
};
pub use score::{score_features, Award, ClaimVector, MarkerSnapshot, MarkerView, ScoreDelta};
pub use structure::{feature_value, trace, Structure, CLOISTER_VALUE};
