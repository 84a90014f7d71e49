mod simulated_camera;

pub use simulated_camera::{SimulatedCamera, SimulatedSession};
