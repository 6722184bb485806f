//! Widget placement: turns a layout selector into filler heights above and
//! below the embedded widget.

use std::fmt;
use std::str::FromStr;

const QUARTER: f64 = 0.25;
const HALF: f64 = 0.5;
const TWO_THIRD: f64 = 0.66;
const THREE_QUARTER: f64 = 0.75;

/// Where the widget sits inside the home container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WidgetLayoutSelector {
    #[default]
    FullScreen,
    TopQuarter,
    TopThird,
    TopHalf,
    Center,
    BottomHalf,
    BottomThird,
    BottomQuarter,
}

impl WidgetLayoutSelector {
    pub const ALL: [WidgetLayoutSelector; 8] = [
        WidgetLayoutSelector::FullScreen,
        WidgetLayoutSelector::TopQuarter,
        WidgetLayoutSelector::TopThird,
        WidgetLayoutSelector::TopHalf,
        WidgetLayoutSelector::Center,
        WidgetLayoutSelector::BottomHalf,
        WidgetLayoutSelector::BottomThird,
        WidgetLayoutSelector::BottomQuarter,
    ];

    /// Persisted integer code.
    pub fn code(self) -> i32 {
        match self {
            WidgetLayoutSelector::FullScreen => -1,
            WidgetLayoutSelector::TopQuarter => 0,
            WidgetLayoutSelector::TopThird => 5,
            WidgetLayoutSelector::TopHalf => 10,
            WidgetLayoutSelector::Center => 15,
            WidgetLayoutSelector::BottomHalf => 20,
            WidgetLayoutSelector::BottomThird => 25,
            WidgetLayoutSelector::BottomQuarter => 30,
        }
    }

    /// Decode a persisted code. Unknown codes mean full screen.
    pub fn from_code(code: i32) -> Self {
        Self::ALL
            .into_iter()
            .find(|selector| selector.code() == code)
            .unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            WidgetLayoutSelector::FullScreen => "full-screen",
            WidgetLayoutSelector::TopQuarter => "top-quarter",
            WidgetLayoutSelector::TopThird => "top-third",
            WidgetLayoutSelector::TopHalf => "top-half",
            WidgetLayoutSelector::Center => "center",
            WidgetLayoutSelector::BottomHalf => "bottom-half",
            WidgetLayoutSelector::BottomThird => "bottom-third",
            WidgetLayoutSelector::BottomQuarter => "bottom-quarter",
        }
    }

    /// (top, bottom) share of the usable height.
    fn fractions(self) -> (f64, f64) {
        match self {
            WidgetLayoutSelector::FullScreen => (0.0, 0.0),
            WidgetLayoutSelector::TopQuarter => (0.0, THREE_QUARTER),
            WidgetLayoutSelector::TopThird => (0.0, TWO_THIRD),
            WidgetLayoutSelector::TopHalf => (0.0, HALF),
            WidgetLayoutSelector::Center => (QUARTER, QUARTER),
            WidgetLayoutSelector::BottomHalf => (HALF, 0.0),
            WidgetLayoutSelector::BottomThird => (TWO_THIRD, 0.0),
            WidgetLayoutSelector::BottomQuarter => (THREE_QUARTER, 0.0),
        }
    }
}

impl fmt::Display for WidgetLayoutSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown widget layout: {0}")]
pub struct UnknownLayout(pub String);

impl FromStr for WidgetLayoutSelector {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|selector| selector.name() == s)
            .ok_or_else(|| UnknownLayout(s.to_string()))
    }
}

/// Height of the home container as reported by the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContainerHeight {
    /// Not measured yet.
    #[default]
    Undefined,
    Known(i32),
}

/// Filler heights, in the unit of the container height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fillers {
    pub top: i32,
    pub bottom: i32,
}

/// Compute the fillers around the widget.
///
/// Top and bottom are rounded independently, so `top + widget + bottom`
/// may be off by one unit from the container height.
pub fn compute_fillers(
    selector: WidgetLayoutSelector,
    container: ContainerHeight,
    dock_height: i32,
) -> Fillers {
    let ContainerHeight::Known(container_height) = container else {
        return Fillers::default();
    };

    let usable = f64::from(container_height) - f64::from(dock_height);

    // Room for at least a second dock-sized band
    if usable - f64::from(dock_height) <= 0.0 {
        return Fillers::default();
    }

    let (top, bottom) = selector.fractions();
    Fillers {
        top: (usable * top).round() as i32,
        bottom: (usable * bottom).round() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCK: i32 = 60;

    #[test]
    fn test_undefined_height_collapses_every_selector() {
        for selector in WidgetLayoutSelector::ALL {
            assert_eq!(
                compute_fillers(selector, ContainerHeight::Undefined, DOCK),
                Fillers::default()
            );
        }
    }

    #[test]
    fn test_center() {
        let fillers = compute_fillers(WidgetLayoutSelector::Center, ContainerHeight::Known(160), DOCK);
        assert_eq!(fillers, Fillers { top: 25, bottom: 25 });
    }

    #[test]
    fn test_top_half() {
        let fillers =
            compute_fillers(WidgetLayoutSelector::TopHalf, ContainerHeight::Known(160), DOCK);
        assert_eq!(fillers, Fillers { top: 0, bottom: 50 });
    }

    #[test]
    fn test_full_screen_has_no_fillers() {
        let fillers =
            compute_fillers(WidgetLayoutSelector::FullScreen, ContainerHeight::Known(1000), DOCK);
        assert_eq!(fillers, Fillers::default());
    }

    #[test]
    fn test_too_small_for_second_dock() {
        for height in [0, 60, 119, 120, -5] {
            for selector in WidgetLayoutSelector::ALL {
                assert_eq!(
                    compute_fillers(selector, ContainerHeight::Known(height), DOCK),
                    Fillers::default(),
                    "height {height}, {selector}"
                );
            }
        }
        let fillers =
            compute_fillers(WidgetLayoutSelector::TopHalf, ContainerHeight::Known(121), DOCK);
        assert_eq!(fillers, Fillers { top: 0, bottom: 31 });
    }

    #[test]
    fn test_fractions_per_selector() {
        let height = ContainerHeight::Known(460); // usable 400
        let expected = [
            (WidgetLayoutSelector::TopQuarter, 0, 300),
            (WidgetLayoutSelector::TopThird, 0, 264),
            (WidgetLayoutSelector::TopHalf, 0, 200),
            (WidgetLayoutSelector::Center, 100, 100),
            (WidgetLayoutSelector::BottomHalf, 200, 0),
            (WidgetLayoutSelector::BottomThird, 264, 0),
            (WidgetLayoutSelector::BottomQuarter, 300, 0),
        ];
        for (selector, top, bottom) in expected {
            assert_eq!(compute_fillers(selector, height, DOCK), Fillers { top, bottom });
        }
    }

    #[test]
    fn test_rounding_is_independent() {
        // usable 101: 101 * 0.25 = 25.25 on both sides
        let fillers = compute_fillers(WidgetLayoutSelector::Center, ContainerHeight::Known(161), DOCK);
        assert_eq!(fillers, Fillers { top: 25, bottom: 25 });

        // usable 102: 102 * 0.66 = 67.32
        let fillers =
            compute_fillers(WidgetLayoutSelector::BottomThird, ContainerHeight::Known(162), DOCK);
        assert_eq!(fillers, Fillers { top: 67, bottom: 0 });
    }

    #[test]
    fn test_codes() {
        for selector in WidgetLayoutSelector::ALL {
            assert_eq!(WidgetLayoutSelector::from_code(selector.code()), selector);
            assert_eq!(selector.name().parse::<WidgetLayoutSelector>().unwrap(), selector);
        }
        assert_eq!(WidgetLayoutSelector::from_code(3), WidgetLayoutSelector::FullScreen);
        assert!("sideways".parse::<WidgetLayoutSelector>().is_err());
    }
}
