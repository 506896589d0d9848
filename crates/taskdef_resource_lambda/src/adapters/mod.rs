pub mod callback;
pub mod ecs;
pub mod ecs_mapping;
pub mod registry;
