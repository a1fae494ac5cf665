mod controls;
mod inspector;
mod panels;
mod stats;

pub(super) use panels::query_bar;
