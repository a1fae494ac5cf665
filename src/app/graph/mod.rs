mod build;
mod interaction;
mod view;

pub(super) use view::{ACTIVE_EDGE_COLOR, INACTIVE_EDGE_COLOR};
