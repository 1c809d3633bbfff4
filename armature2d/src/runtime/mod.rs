mod animation;
mod animation_state;
mod armature;
mod pool;
mod skeleton;
mod timeline_state;
mod world_clock;

pub use animation::*;
pub use animation_state::*;
pub use armature::*;
pub use pool::PoolStats;
pub use skeleton::*;
pub use timeline_state::*;
pub use world_clock::*;

#[cfg(test)]
mod test_support;



#[cfg(test)]
mod timeline_state_tests;


#[cfg(test)]
mod world_clock_tests;
