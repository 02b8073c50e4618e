pub mod profile;
pub mod window_state;

pub use profile::{validate_profile_name, ProfileSummary};
pub use window_state::{GeometryRequest, WindowState};
