//! Line commands read from stdin.

use capy_home::{AppId, ContainerHeight, WidgetLayoutSelector};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DaemonCommand {
    Open(AppId),
    Reset(AppId),
    ToggleDisabled(AppId),
    ToggleSticky(AppId),
    /// Packages may have changed.
    Refresh,
    /// The home screen became visible again.
    Resume,
    Height(ContainerHeight),
    Layout(WidgetLayoutSelector),
    Widget(i32),
    RemoveWidget,
    Status,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown widget layout: {0}")]
    Layout(String),
}

impl DaemonCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb, args.as_slice()) {
            ("open", _) => Self::Open(app_id(&args, "open <package> <component>")?),
            ("reset", _) => Self::Reset(app_id(&args, "reset <package> <component>")?),
            ("toggle-disabled", _) => {
                Self::ToggleDisabled(app_id(&args, "toggle-disabled <package> <component>")?)
            }
            ("toggle-sticky", _) => {
                Self::ToggleSticky(app_id(&args, "toggle-sticky <package> <component>")?)
            }
            ("refresh", []) => Self::Refresh,
            ("resume", []) => Self::Resume,
            ("height", ["undefined"]) => Self::Height(ContainerHeight::Undefined),
            ("height", [n]) => Self::Height(ContainerHeight::Known(
                n.parse()
                    .map_err(|_| CommandError::Usage("height <pixels|undefined>"))?,
            )),
            ("layout", [name]) => Self::Layout(
                name.parse()
                    .map_err(|_| CommandError::Layout(name.to_string()))?,
            ),
            ("widget", [id]) => Self::Widget(
                id.parse()
                    .map_err(|_| CommandError::Usage("widget <id>"))?,
            ),
            ("remove-widget", []) => Self::RemoveWidget,
            ("status", []) => Self::Status,
            ("quit", []) => Self::Quit,
            ("height", _) => return Err(CommandError::Usage("height <pixels|undefined>")),
            ("layout", _) => return Err(CommandError::Usage("layout <name>")),
            ("widget", _) => return Err(CommandError::Usage("widget <id>")),
            _ => return Err(CommandError::Unknown(line.trim().to_string())),
        };

        Ok(Some(command))
    }
}

/// The component may contain spaces (it is usually an `Exec` line).
fn app_id(args: &[&str], usage: &'static str) -> Result<AppId, CommandError> {
    match args {
        [package, component @ ..] if !component.is_empty() => {
            Ok(AppId::new(*package, component.join(" ")))
        }
        _ => Err(CommandError::Usage(usage)),
    }
}
