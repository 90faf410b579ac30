pub mod time;

/// Generates a url-safe random id for sessions.
pub fn longid() -> String {
    nanoid::nanoid!(21)
}
