#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Spin { winner: Option<usize> },
    Reload,
}
