// Entity Models
// Three fixed levels: entity → group periods → super-group periods.
// Every node is owned by its parent and immutable once assembled.

pub mod entity;
pub mod group;
pub mod super_group;

pub use entity::Entity;
pub use group::GroupMembership;
pub use super_group::SuperGroupMembership;
