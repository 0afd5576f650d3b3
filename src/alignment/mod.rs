pub mod delta;
pub mod distance;
pub mod ghost;
pub mod resample;

pub use delta::{DeltaPoint, DeltaSeries, time_delta, time_delta_with_grid};
pub use distance::{AlignedPair, AlignedSample, align_by_distance, align_by_distance_with_grid};
pub use ghost::{
    GhostFrame, PositionTrack, TrackBounds, ghost_positions, ghost_positions_with_grid,
};
pub use resample::GRID_POINTS;
