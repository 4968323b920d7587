//! Attachment rules between the paging surface and the indicator strip.
//!
//! [`ConstraintEngine::compute`] is a pure function of the configuration and
//! of whether any indicators exist. It produces a [`ConstraintSet`]: anchor
//! relations for the pager and (optionally) the strip, plus the paging
//! orientation. [`ConstraintEngine::resolve`] turns a set into concrete
//! frames for a given content rect.
//!
//! # Rules
//!
//! - Without indicators the pager fills the content rect and paging is
//!   horizontal.
//! - `Top`/`Bottom` page horizontally; the strip spans the width and is
//!   `indicator_size` tall. `Start`/`End` page vertically with axes swapped.
//! - Inset: the pager fills the content rect and the strip sits inside it,
//!   `indicator_offset` in from its edge.
//! - Non-inset: the strip sits on its edge of the content rect and the pager
//!   is attached back-to-back with it, `indicator_offset` apart, shrinking to
//!   make room.
//!
//! # Margins
//!
//! As with any anchor, a positive margin on a `Left`/`Top` source line moves
//! it right/down from the target, and on a `Right`/`Bottom` source line moves
//! it left/up.

use crate::config::CarouselConfig;
use crate::geometry::{Insets, Orientation, Rect, Size};
use horizon_carousel_core::logging::targets;

/// Edge lines an anchor can attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorLine {
    Left,
    Right,
    Top,
    Bottom,
}

impl AnchorLine {
    /// Check if this line positions along the x axis.
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, AnchorLine::Left | AnchorLine::Right)
    }

    /// The line on the other side of the same axis.
    pub fn opposite(self) -> Self {
        match self {
            AnchorLine::Left => AnchorLine::Right,
            AnchorLine::Right => AnchorLine::Left,
            AnchorLine::Top => AnchorLine::Bottom,
            AnchorLine::Bottom => AnchorLine::Top,
        }
    }

    fn position_in(self, rect: Rect) -> f32 {
        match self {
            AnchorLine::Left => rect.left(),
            AnchorLine::Right => rect.right(),
            AnchorLine::Top => rect.top(),
            AnchorLine::Bottom => rect.bottom(),
        }
    }
}

/// The two items the engine positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutItem {
    /// The paging surface.
    Pager,
    /// The indicator strip.
    Strip,
}

impl LayoutItem {
    fn slot(self) -> usize {
        match self {
            LayoutItem::Pager => 0,
            LayoutItem::Strip => 1,
        }
    }
}

/// What an anchor attaches to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorTarget {
    /// An edge of the content rect.
    Parent(AnchorLine),
    /// An edge of the other item.
    Sibling { item: LayoutItem, line: AnchorLine },
}

/// One edge attachment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub source_line: AnchorLine,
    pub target: AnchorTarget,
    pub margin: f32,
}

impl Anchor {
    /// Attach `line` to the same line of the content rect.
    pub fn to_parent(line: AnchorLine, margin: f32) -> Self {
        Self {
            source_line: line,
            target: AnchorTarget::Parent(line),
            margin,
        }
    }

    /// Attach `line` to `target_line` of `item`.
    pub fn to_sibling(line: AnchorLine, item: LayoutItem, target_line: AnchorLine, margin: f32) -> Self {
        Self {
            source_line: line,
            target: AnchorTarget::Sibling {
                item,
                line: target_line,
            },
            margin,
        }
    }
}

/// How an item is sized along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Stretch between the anchored edges.
    MatchConstraint,
    /// Use the item's own preferred extent.
    Wrap,
}

/// Anchors and sizing for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemConstraints {
    pub anchors: Vec<Anchor>,
    pub width: Dimension,
    pub height: Dimension,
}

impl ItemConstraints {
    fn fill_parent() -> Self {
        Self {
            anchors: [AnchorLine::Left, AnchorLine::Top, AnchorLine::Right, AnchorLine::Bottom]
                .into_iter()
                .map(|line| Anchor::to_parent(line, 0.0))
                .collect(),
            width: Dimension::MatchConstraint,
            height: Dimension::MatchConstraint,
        }
    }

    /// The anchor on `line`, if any.
    pub fn anchor(&self, line: AnchorLine) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.source_line == line)
    }

    fn set_anchor(&mut self, anchor: Anchor) {
        self.anchors.retain(|a| a.source_line != anchor.source_line);
        self.anchors.push(anchor);
    }
}

/// Output of [`ConstraintEngine::compute`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSet {
    pub orientation: Orientation,
    pub pager: ItemConstraints,
    /// `None` when there are no indicators.
    pub strip: Option<ItemConstraints>,
}

impl ConstraintSet {
    /// Constraints for `item`, if it takes part in the layout.
    pub fn item(&self, item: LayoutItem) -> Option<&ItemConstraints> {
        match item {
            LayoutItem::Pager => Some(&self.pager),
            LayoutItem::Strip => self.strip.as_ref(),
        }
    }
}

/// Resolved frames of the pager and the strip.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutFrames {
    pub pager: Rect,
    pub strip: Option<Rect>,
}

/// Per-edge positions found while resolving one item.
#[derive(Debug, Clone, Copy, Default)]
struct ResolvedEdges {
    left: Option<f32>,
    right: Option<f32>,
    top: Option<f32>,
    bottom: Option<f32>,
}

impl ResolvedEdges {
    fn get(&self, line: AnchorLine) -> Option<f32> {
        match line {
            AnchorLine::Left => self.left,
            AnchorLine::Right => self.right,
            AnchorLine::Top => self.top,
            AnchorLine::Bottom => self.bottom,
        }
    }

    fn set(&mut self, line: AnchorLine, value: f32) {
        match line {
            AnchorLine::Left => self.left = Some(value),
            AnchorLine::Right => self.right = Some(value),
            AnchorLine::Top => self.top = Some(value),
            AnchorLine::Bottom => self.bottom = Some(value),
        }
    }
}

/// Position and extent along one axis from its two optional edges.
fn span(start: Option<f32>, end: Option<f32>, origin: f32, preferred: f32) -> (f32, f32) {
    match (start, end) {
        (Some(start), Some(end)) => (start, (end - start).max(0.0)),
        (Some(start), None) => (start, preferred),
        (None, Some(end)) => (end - preferred, preferred),
        (None, None) => (origin, preferred),
    }
}

/// Computes and resolves pager/strip attachment rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintEngine;

impl ConstraintEngine {
    /// Derive the attachment rules for `config`.
    pub fn compute(config: &CarouselConfig, has_indicators: bool) -> ConstraintSet {
        let mut pager = ItemConstraints::fill_parent();

        if !has_indicators {
            return ConstraintSet {
                orientation: Orientation::Horizontal,
                pager,
                strip: None,
            };
        }

        let position = config.indicator_position;
        let orientation = position.orientation();
        let edge = position.edge();

        // The strip stretches across the axis its edge does not position.
        let (cross_start, cross_end) = if edge.is_horizontal() {
            (AnchorLine::Top, AnchorLine::Bottom)
        } else {
            (AnchorLine::Left, AnchorLine::Right)
        };
        let (width, height) = if edge.is_horizontal() {
            (Dimension::Wrap, Dimension::MatchConstraint)
        } else {
            (Dimension::MatchConstraint, Dimension::Wrap)
        };

        let strip_margin = if config.inset_indicators {
            config.indicator_offset
        } else {
            pager.set_anchor(Anchor::to_sibling(
                edge,
                LayoutItem::Strip,
                edge.opposite(),
                config.indicator_offset,
            ));
            0.0
        };

        let strip = ItemConstraints {
            anchors: vec![
                Anchor::to_parent(edge, strip_margin),
                Anchor::to_parent(cross_start, 0.0),
                Anchor::to_parent(cross_end, 0.0),
            ],
            width,
            height,
        };

        ConstraintSet {
            orientation,
            pager,
            strip: Some(strip),
        }
    }

    /// Resolve `set` into frames inside `content`.
    ///
    /// `strip_thickness` is the strip's extent on the axis it does not
    /// stretch across.
    pub fn resolve(set: &ConstraintSet, content: Rect, strip_thickness: f32) -> LayoutFrames {
        let order = [LayoutItem::Strip, LayoutItem::Pager];
        let mut geometry: [Option<Rect>; 2] = [None, None];
        let mut resolved = [ResolvedEdges::default(); 2];

        // Multiple passes, so sibling anchors resolve regardless of order.
        const MAX_ITERATIONS: usize = 10;
        for _ in 0..MAX_ITERATIONS {
            let mut changed = false;

            for item in order {
                let Some(constraints) = set.item(item) else {
                    continue;
                };
                let edges = &mut resolved[item.slot()];

                for anchor in &constraints.anchors {
                    let target = match anchor.target {
                        AnchorTarget::Parent(line) => Some(line.position_in(content)),
                        AnchorTarget::Sibling { item, line } => {
                            geometry[item.slot()].map(|rect| line.position_in(rect))
                        }
                    };
                    let Some(target) = target else {
                        continue;
                    };

                    let position = match anchor.source_line {
                        AnchorLine::Left | AnchorLine::Top => target + anchor.margin,
                        AnchorLine::Right | AnchorLine::Bottom => target - anchor.margin,
                    };
                    if edges.get(anchor.source_line) != Some(position) {
                        edges.set(anchor.source_line, position);
                        changed = true;
                    }
                }

                let preferred = Size::new(
                    match constraints.width {
                        Dimension::Wrap => strip_thickness,
                        Dimension::MatchConstraint => content.width(),
                    },
                    match constraints.height {
                        Dimension::Wrap => strip_thickness,
                        Dimension::MatchConstraint => content.height(),
                    },
                );
                let (x, width) = span(edges.left, edges.right, content.left(), preferred.width);
                let (y, height) = span(edges.top, edges.bottom, content.top(), preferred.height);
                geometry[item.slot()] = Some(Rect::new(x, y, width, height));
            }

            if !changed {
                break;
            }
        }

        let frames = LayoutFrames {
            pager: geometry[LayoutItem::Pager.slot()].unwrap_or(content),
            strip: geometry[LayoutItem::Strip.slot()],
        };
        tracing::trace!(target: targets::LAYOUT, ?frames, "constraints resolved");
        frames
    }

    /// Extra padding that keeps a scaled-up active indicator inside bounds.
    ///
    /// Only the indicator side is padded, only in non-inset mode, and only
    /// when there are indicators. The amount is floored to whole pixels.
    pub fn padding(config: &CarouselConfig, has_indicators: bool) -> Insets {
        if !has_indicators || config.inset_indicators {
            return Insets::ZERO;
        }

        let amount = (config.indicator_size * config.indicator_active_scale_factor / 2.0).floor();
        match config.indicator_position.edge() {
            AnchorLine::Left => Insets::new(amount, 0.0, 0.0, 0.0),
            AnchorLine::Top => Insets::new(0.0, amount, 0.0, 0.0),
            AnchorLine::Right => Insets::new(0.0, 0.0, amount, 0.0),
            AnchorLine::Bottom => Insets::new(0.0, 0.0, 0.0, amount),
        }
    }
}
