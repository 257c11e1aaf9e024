pub mod states;
pub mod params;
pub mod forces;
pub mod integrator;
pub mod collision;
pub mod merge;
pub mod deformation;
pub mod camera;
pub mod timeline;
pub mod controls;
pub mod scenario;
pub mod sequence;
pub mod events;
pub mod world;
