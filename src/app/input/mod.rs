mod key;
mod mouse;
