use image::{Rgba, RgbaImage};

use crate::base::Base;
use crate::color::{Color, Step, MY_BLUE, MY_CYAN, MY_RED, MY_YELLOW, WHITE};
use crate::draw::{draw_ellipse, draw_polygon};
use crate::error::Error;

pub const DEFAULT_THICKNESS: u32 = 2;

/// Number of rarity tiers every mark group renders.
pub const TIER_COUNT: usize = 8;

/// Radius of the solid core of a gradient circle.
const GRADIENT_CORE_RADIUS: u32 = 2;

/// Hand-tuned octagon for radius 2; a true ellipse is lopsided at that size.
const SMALL_CIRCLE_POLYGON: [(i32, i32); 8] = [
    (1, 0),
    (3, 0),
    (4, 1),
    (4, 3),
    (3, 4),
    (1, 4),
    (0, 3),
    (0, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    SinglePoint,
    SimpleCircle,
    GradientCircle,
    FourEdgeSlimStar,
}

impl TryFrom<u8> for MarkKind {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(MarkKind::SinglePoint),
            1 => Ok(MarkKind::SimpleCircle),
            2 => Ok(MarkKind::GradientCircle),
            3 => Ok(MarkKind::FourEdgeSlimStar),
            other => Err(Error::Validation(format!("unknown mark kind <{other}>"))),
        }
    }
}

/// What gets stamped for one variant: a bare pixel or a small RGBA raster.
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    Pixel(Rgba<u8>),
    Stamp(RgbaImage),
}

/// A glyph and the parameters it was rendered from. Immutable once built.
#[derive(Debug, Clone)]
pub struct Mark {
    kind: MarkKind,
    radius: u32,
    color: Color,
    outline: Option<Color>,
    thickness: u32,
    glyph: Glyph,
}

impl Mark {
    pub fn new(kind: MarkKind, radius: u32, color: Color, outline: Option<Color>, thickness: u32) -> Self {
        let glyph = match kind {
            MarkKind::SinglePoint => Glyph::Pixel(color.to_rgba()),
            MarkKind::SimpleCircle => Glyph::Stamp(simple_circle(radius, color, outline)),
            MarkKind::GradientCircle => Glyph::Stamp(gradient_circle(radius, color, Step::default())),
            MarkKind::FourEdgeSlimStar => {
                Glyph::Stamp(four_edge_star(radius, color, outline, thickness))
            }
        };
        Mark {
            kind,
            radius,
            color,
            outline,
            thickness,
            glyph,
        }
    }

    pub fn kind(&self) -> MarkKind {
        self.kind
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn outline(&self) -> Option<Color> {
        self.outline
    }

    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    pub fn glyph(&self) -> &Glyph {
        &self.glyph
    }
}

fn blank(radius: u32) -> RgbaImage {
    let side = radius * 2 + 1;
    RgbaImage::new(side, side)
}

fn simple_circle(radius: u32, color: Color, outline: Option<Color>) -> RgbaImage {
    let mut image = blank(radius);
    let fill = Some(color.to_rgba());
    let outline = outline.map(Color::to_rgba);
    if radius == 2 {
        draw_polygon(&mut image, &SMALL_CIRCLE_POLYGON, fill, outline);
    } else {
        let d = (radius * 2) as i32;
        draw_ellipse(&mut image, (0, 0, d, d), fill, outline);
    }
    image
}

/// Solid core fading towards black one ring per pixel of radius.
fn gradient_circle(radius: u32, color: Color, step: Step) -> RgbaImage {
    let mut image = blank(radius);
    let c = radius as i32;
    let ring = |r: u32| (c - r as i32, c - r as i32, c + r as i32, c + r as i32);

    let core = color.to_rgba();
    draw_ellipse(&mut image, ring(GRADIENT_CORE_RADIUS.min(radius)), Some(core), Some(core));

    let mut shade = color;
    for r in GRADIENT_CORE_RADIUS + 1..=radius {
        shade = shade.decrease(step);
        draw_ellipse(&mut image, ring(r), None, Some(shade.to_rgba()));
    }
    image
}

fn four_edge_star(radius: u32, color: Color, outline: Option<Color>, thickness: u32) -> RgbaImage {
    let mut image = blank(radius);
    let points = four_edge_star_polygon(0, 0, (radius * 2) as i32, (radius * 2) as i32, thickness as i32);
    draw_polygon(&mut image, &points, Some(color.to_rgba()), outline.map(Color::to_rgba));
    image
}

/// Eight-point outline of a slim four-armed star inside `(x1, y1)-(x2, y2)`.
fn four_edge_star_polygon(x1: i32, y1: i32, x2: i32, y2: i32, thickness: i32) -> [(i32, i32); 8] {
    let mid_x = x1 + (x2 - x1) / 2;
    let mid_y = y1 + (y2 - y1) / 2;
    [
        (mid_x, y1),
        (mid_x + thickness, mid_y - thickness),
        (x2, mid_y),
        (mid_x + thickness, mid_y + thickness),
        (mid_x, y2),
        (mid_x - thickness, mid_y + thickness),
        (x1, mid_y),
        (mid_x - thickness, mid_y - thickness),
    ]
}

struct TierSpec {
    kind: MarkKind,
    radius: u32,
    thickness: u32,
    /// Use the allele's colors; otherwise plain white with no outline.
    allele_colored: bool,
}

const TIERS: [TierSpec; TIER_COUNT] = [
    TierSpec { kind: MarkKind::FourEdgeSlimStar, radius: 30, thickness: 3, allele_colored: true },
    TierSpec { kind: MarkKind::FourEdgeSlimStar, radius: 18, thickness: 2, allele_colored: true },
    TierSpec { kind: MarkKind::FourEdgeSlimStar, radius: 12, thickness: 1, allele_colored: true },
    TierSpec { kind: MarkKind::FourEdgeSlimStar, radius: 6, thickness: 1, allele_colored: true },
    TierSpec { kind: MarkKind::SimpleCircle, radius: 2, thickness: DEFAULT_THICKNESS, allele_colored: true },
    TierSpec { kind: MarkKind::SimpleCircle, radius: 2, thickness: DEFAULT_THICKNESS, allele_colored: false },
    TierSpec { kind: MarkKind::SimpleCircle, radius: 1, thickness: DEFAULT_THICKNESS, allele_colored: false },
    TierSpec { kind: MarkKind::SinglePoint, radius: 1, thickness: DEFAULT_THICKNESS, allele_colored: false },
];

/// Fill and outline per substituted base.
const PALETTE: [(Base, Color, Color); 4] = [
    (Base::A, WHITE, MY_RED),
    (Base::C, WHITE, MY_YELLOW),
    (Base::G, WHITE, MY_CYAN),
    (Base::T, WHITE, MY_BLUE),
];

/// The eight tier marks of one substituted base.
#[derive(Debug, Clone)]
pub struct MarkGroup {
    allele: Base,
    color: Color,
    outline: Color,
    marks: Vec<Mark>,
}

impl MarkGroup {
    pub fn new(allele: Base, color: Color, outline: Color) -> Self {
        let marks = TIERS
            .iter()
            .map(|spec| {
                if spec.allele_colored {
                    Mark::new(spec.kind, spec.radius, color, Some(outline), spec.thickness)
                } else {
                    Mark::new(spec.kind, spec.radius, WHITE, None, spec.thickness)
                }
            })
            .collect();
        MarkGroup {
            allele,
            color,
            outline,
            marks,
        }
    }

    pub fn allele(&self) -> Base {
        self.allele
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn outline(&self) -> Color {
        self.outline
    }

    /// Mark for a 1-based rarity tier.
    pub fn mark(&self, tier: usize) -> Option<&Mark> {
        tier.checked_sub(1).and_then(|i| self.marks.get(i))
    }
}

/// One mark group per base, built once and shared by every render.
#[derive(Debug, Clone)]
pub struct MarkSet {
    groups: Vec<MarkGroup>,
}

impl MarkSet {
    pub fn new() -> Self {
        MarkSet {
            groups: PALETTE
                .iter()
                .map(|&(base, color, outline)| MarkGroup::new(base, color, outline))
                .collect(),
        }
    }

    pub fn group(&self, base: Base) -> Option<&MarkGroup> {
        self.groups.iter().find(|g| g.allele == base)
    }

    /// Group for an alternate allele string; multi-base alleles have none.
    pub fn group_for_alt(&self, alt: &str) -> Option<&MarkGroup> {
        match alt.as_bytes() {
            [b] => Base::from_byte(*b).and_then(|base| self.group(base)),
            _ => None,
        }
    }
}

impl Default for MarkSet {
    fn default() -> Self {
        Self::new()
    }
}
