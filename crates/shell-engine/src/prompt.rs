//! Prompt metrics, derived fresh for every positioning calculation.
//!
//! The prompt length feeds every geometry computation, so it is recomputed
//! from the live user/host rather than cached: a `su` mid-session changes the
//! wrap capacity of the prompt row on the very next redraw.

use shell_geometry::WrapGeometry;
use shell_state::cell_count;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub user: String,
    pub host: String,
    pub symbol: String,
}

impl Prompt {
    pub fn new(user: &str, host: &str, symbol: &str) -> Self {
        Self {
            user: user.to_string(),
            host: host.to_string(),
            symbol: symbol.to_string(),
        }
    }

    /// The literal prompt text, trailing space included.
    pub fn text(&self) -> String {
        format!("{}@{} {} ", self.user, self.host, self.symbol)
    }

    /// Prompt width in cells.
    pub fn cells(&self) -> usize {
        cell_count(&self.text())
    }

    pub fn geometry(&self, cols: u16) -> WrapGeometry {
        WrapGeometry::new(cols as usize, self.cells())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_matches_user_host_symbol_shape() {
        let p = Prompt::new("guest", "kiosk", "$");
        assert_eq!(p.text(), "guest@kiosk $ ");
        assert_eq!(p.cells(), 14);
    }

    #[test]
    fn metrics_follow_a_user_change() {
        let before = Prompt::new("guest", "kiosk", "$").cells();
        let after = Prompt::new("root", "kiosk", "$").cells();
        assert_eq!(before - after, 1);
    }
}
