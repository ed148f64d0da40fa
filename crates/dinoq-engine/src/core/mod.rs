pub use self::{collision::*, obstacle::*, physics::*};

pub(crate) mod collision;
pub(crate) mod obstacle;
pub(crate) mod physics;
