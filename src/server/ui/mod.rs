mod activity;
mod help;
mod leaderboard;
mod render;

pub use render::render;
