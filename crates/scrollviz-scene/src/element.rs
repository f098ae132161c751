#![forbid(unsafe_code)]

//! Element identity and attribute vocabulary shared by every scene.

/// Opaque handle to an element created through [`Scene::select`].
///
/// Handles are only meaningful for the scene that issued them and only until
/// the next [`Scene::clear`].
///
/// [`Scene::select`]: crate::Scene::select
/// [`Scene::clear`]: crate::Scene::clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub(crate) u32);

impl Handle {
    /// Raw index, stable for the lifetime of the element.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Kind of drawable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Container; its translation and opacity apply to its children.
    Group,
    Circle,
    Line,
    Text,
    /// Container holding tick marks and tick labels.
    Axis,
}

impl ElementKind {
    /// Lowercase name used in snapshots.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Circle => "circle",
            Self::Line => "line",
            Self::Text => "text",
            Self::Axis => "axis",
        }
    }
}

/// Numeric element attributes that can be set or animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    X1,
    Y1,
    X2,
    Y2,
    Cx,
    Cy,
    R,
    Opacity,
    TranslateX,
    TranslateY,
}

impl Attr {
    /// Number of attributes.
    pub const COUNT: usize = 10;

    /// Every attribute, in storage order.
    pub const ALL: [Attr; Self::COUNT] = [
        Attr::X1,
        Attr::Y1,
        Attr::X2,
        Attr::Y2,
        Attr::Cx,
        Attr::Cy,
        Attr::R,
        Attr::Opacity,
        Attr::TranslateX,
        Attr::TranslateY,
    ];

    /// Storage slot.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Value of a freshly created element. Everything starts at the origin
    /// and fully opaque.
    #[inline]
    pub const fn initial(self) -> f64 {
        match self {
            Self::Opacity => 1.0,
            _ => 0.0,
        }
    }

    /// Attribute name used in snapshots.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X1 => "x1",
            Self::Y1 => "y1",
            Self::X2 => "x2",
            Self::Y2 => "y2",
            Self::Cx => "cx",
            Self::Cy => "cy",
            Self::R => "r",
            Self::Opacity => "opacity",
            Self::TranslateX => "tx",
            Self::TranslateY => "ty",
        }
    }
}

/// Which side of the plot an axis is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrient {
    /// Horizontal axis, ticks below the line.
    Bottom,
    /// Vertical axis, ticks left of the line.
    Left,
}

/// One tick: pixel offset along the axis and its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub offset: f64,
    pub label: String,
}

/// Tick content of an axis element.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    pub orient: AxisOrient,
    /// Pixel extent of the axis line.
    pub range: [f64; 2],
    pub ticks: Vec<Tick>,
}
