/// Frame sources and the pack session driver.
pub mod pack_session;
