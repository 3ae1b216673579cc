//! Assigns measured blocks to pages.
//!
//! The planner is a fold over the block list with an immutable
//! [`LayoutCursor`]: each step takes the cursor and returns the placements it
//! made together with the next cursor. Nothing is mutated behind the caller's
//! back, so planning the same blocks twice yields identical plans.

use std::ops::Range;

use serde::Serialize;

use crate::config::{LayoutConfig, OrphanRules};
use crate::measure::{BlockContent, RenderBlock, TextContent};
use crate::warning::LayoutWarning;

/// Slack for float accumulation when comparing against the bottom margin.
const EPSILON: f32 = 0.01;

/// Minimum lines of a split paragraph kept on either side of a page break.
const MIN_SPLIT_LINES: usize = 2;

/// Vertical extent of the usable area on every page, top-down coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub top: f32,
    pub bottom: f32,
    pub line_height: f32,
    pub rules: OrphanRules,
}

impl PageGeometry {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            top: config.content_top(),
            bottom: config.content_bottom(),
            line_height: config.line_height,
            rules: config.orphans,
        }
    }

    pub fn content_height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Current page and vertical offset from the top edge of that page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LayoutCursor {
    pub page: usize,
    pub y: f32,
}

impl LayoutCursor {
    pub fn start(geo: &PageGeometry) -> Self {
        Self {
            page: 0,
            y: geo.top,
        }
    }

    pub fn advance(self, dy: f32) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }

    pub fn next_page(self, geo: &PageGeometry) -> Self {
        Self {
            page: self.page + 1,
            y: geo.top,
        }
    }

    pub fn remaining(self, geo: &PageGeometry) -> f32 {
        geo.bottom - self.y
    }

    pub fn at_page_top(self, geo: &PageGeometry) -> bool {
        self.y <= geo.top + EPSILON
    }

    fn fits(self, height: f32, geo: &PageGeometry) -> bool {
        self.y + height <= geo.bottom + EPSILON
    }
}

/// One block, or a run of its lines, on one page. `y` is the top of the
/// placed part.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Placement {
    pub page: usize,
    pub block: usize,
    pub y: f32,
    pub lines: Range<usize>,
}

impl Placement {
    /// The placement draws the block's first line.
    pub fn is_first_part(&self) -> bool {
        self.lines.start == 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PagePlan {
    pub placements: Vec<Placement>,
    pub page_count: usize,
}

impl PagePlan {
    pub fn on_page(&self, page: usize) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.page == page)
    }
}

/// Assign every block to a page. Always yields at least one page.
pub fn plan(blocks: &[RenderBlock], geo: &PageGeometry) -> (PagePlan, Vec<LayoutWarning>) {
    let planner = Planner { blocks, geo };
    let mut placements = Vec::new();
    let mut warnings = Vec::new();
    let mut cursor = LayoutCursor::start(geo);

    for index in 0..blocks.len() {
        cursor = planner.break_before(index, cursor);
        let step = planner.place(index, cursor);
        placements.extend(step.placements);
        warnings.extend(step.warning);
        cursor = step.cursor;
    }

    let page_count = placements.last().map_or(1, |p| p.page + 1);
    log::debug!(
        "planned {} blocks into {} placements over {page_count} pages",
        blocks.len(),
        placements.len()
    );
    (
        PagePlan {
            placements,
            page_count,
        },
        warnings,
    )
}

struct Step {
    cursor: LayoutCursor,
    placements: Vec<Placement>,
    warning: Option<LayoutWarning>,
}

struct Planner<'a> {
    blocks: &'a [RenderBlock],
    geo: &'a PageGeometry,
}

impl Planner<'_> {
    fn starts_group(&self, index: usize) -> bool {
        let group = self.blocks[index].group;
        group.is_some() && (index == 0 || self.blocks[index - 1].group != group)
    }

    /// Total height of the group starting at `index`.
    fn group_height(&self, index: usize) -> f32 {
        let group = self.blocks[index].group;
        self.blocks[index..]
            .iter()
            .take_while(|b| b.group == group)
            .map(|b| b.height)
            .sum()
    }

    /// Height of a group's opening: every block up to and including the
    /// first bullet, or the whole group when it has none.
    fn group_lead_height(&self, index: usize) -> f32 {
        let group = self.blocks[index].group;
        let mut height = 0.0;
        for block in self.blocks[index..].iter().take_while(|b| b.group == group) {
            height += block.height;
            if block.text().is_some_and(|t| t.bullet) {
                break;
            }
        }
        height
    }

    /// Whether an entry starting at `cursor` should move to the next page.
    fn entry_breaks(&self, index: usize, cursor: LayoutCursor) -> bool {
        let geo = self.geo;
        // Headings directly above the entry travel with it, so an entry that
        // only has them above it on the page is already at the top.
        let lead_in: f32 = self.blocks[..index]
            .iter()
            .rev()
            .take_while(|b| b.keep_with_next)
            .map(|b| b.height)
            .sum();
        if cursor.advance(-lead_in).at_page_top(geo) {
            return false;
        }
        let rules = &geo.rules;
        let content_height = geo.content_height();
        if cursor.remaining(geo) < rules.min_remaining_fraction * content_height {
            return true;
        }
        let estimate = self.group_height(index);
        if estimate <= content_height {
            let safety = (rules.safety_lines * geo.line_height).max(rules.safety_fraction * estimate);
            cursor.y + estimate > geo.bottom - safety
        } else {
            // Too tall for any page: only its opening has to fit here.
            !cursor.fits(self.group_lead_height(index), geo)
        }
    }

    /// Least height the block must get on the current page before it is
    /// worth starting there.
    fn lead_requirement(&self, index: usize) -> f32 {
        let block = &self.blocks[index];
        match &block.content {
            // Shorter paragraphs cannot be split with enough lines on both sides.
            BlockContent::Text(t)
                if block.is_splittable() && t.lines.len() >= 2 * MIN_SPLIT_LINES =>
            {
                t.lead + MIN_SPLIT_LINES as f32 * self.geo.line_height
            }
            _ => block.height.min(self.geo.content_height()),
        }
    }

    /// Whether the run of keep-with-next blocks at `index` plus the start of
    /// the block that follows would cross the page end.
    fn chain_breaks(&self, index: usize, cursor: LayoutCursor) -> bool {
        let geo = self.geo;
        if cursor.at_page_top(geo) {
            return false;
        }
        let mut probe = cursor;
        let mut next = index;
        while next < self.blocks.len() && self.blocks[next].keep_with_next {
            probe = probe.advance(self.blocks[next].height);
            next += 1;
        }
        if next == self.blocks.len() {
            return !cursor.fits(probe.y - cursor.y, geo);
        }
        if self.starts_group(next) && self.entry_breaks(next, probe) {
            return true;
        }
        !probe.fits(self.lead_requirement(next), geo)
    }

    /// Page break applied before block `index`, if any.
    fn break_before(&self, index: usize, cursor: LayoutCursor) -> LayoutCursor {
        let block = &self.blocks[index];
        let moved = if block.keep_with_next {
            self.chain_breaks(index, cursor)
        } else if self.starts_group(index) {
            self.entry_breaks(index, cursor)
        } else {
            false
        };
        if moved {
            log::debug!(
                "block {index} ({:?}) moved to page {} from y={:.1}",
                block.kind,
                cursor.page + 2,
                cursor.y
            );
            cursor.next_page(self.geo)
        } else {
            cursor
        }
    }

    fn place(&self, index: usize, cursor: LayoutCursor) -> Step {
        let geo = self.geo;
        let block = &self.blocks[index];

        if cursor.fits(block.height, geo) {
            return Step {
                cursor: cursor.advance(block.height),
                placements: vec![Placement {
                    page: cursor.page,
                    block: index,
                    y: cursor.y,
                    lines: 0..block.line_count(),
                }],
                warning: None,
            };
        }

        let oversized = block.height > geo.content_height() + EPSILON;
        if let Some(text) = block.text().filter(|_| block.is_splittable() || oversized) {
            let mut step = self.split(index, text, cursor);
            if oversized {
                step.warning = Some(self.oversized(index));
            }
            return step;
        }

        let start = if cursor.at_page_top(geo) {
            cursor
        } else {
            cursor.next_page(geo)
        };
        Step {
            cursor: start.advance(block.height),
            placements: vec![Placement {
                page: start.page,
                block: index,
                y: start.y,
                lines: 0..block.line_count(),
            }],
            warning: oversized.then(|| self.oversized(index)),
        }
    }

    fn oversized(&self, index: usize) -> LayoutWarning {
        LayoutWarning::OversizedBlock {
            block: index,
            height: self.blocks[index].height,
            available: self.geo.content_height(),
        }
    }

    /// Spread a text block's lines over as many pages as needed.
    fn split(&self, index: usize, text: &TextContent, cursor: LayoutCursor) -> Step {
        let geo = self.geo;
        let block = &self.blocks[index];
        let total = text.lines.len();
        let lh = geo.line_height;
        // Paragraph widow and orphan control only applies when the block
        // can fit on a page at all.
        let keep = if block.is_splittable() && block.height <= geo.content_height() {
            MIN_SPLIT_LINES
        } else {
            1
        };

        let mut placements = Vec::new();
        let mut cursor = cursor;
        let mut next_line = 0;
        while next_line < total {
            let lead = if next_line == 0 { text.lead } else { 0.0 };
            let left = total - next_line;
            let room = ((cursor.remaining(geo) - lead + EPSILON) / lh).floor().max(0.0) as usize;

            let take = if room >= left {
                left
            } else {
                let mut take = room;
                if left - take < keep {
                    take = left.saturating_sub(keep);
                }
                if take < keep.min(left) {
                    0
                } else {
                    take
                }
            };

            if take == 0 {
                if cursor.at_page_top(geo) {
                    // Line height exceeds the page; draw one line anyway.
                    placements.push(Placement {
                        page: cursor.page,
                        block: index,
                        y: cursor.y,
                        lines: next_line..next_line + 1,
                    });
                    next_line += 1;
                }
                cursor = cursor.next_page(geo);
                continue;
            }

            let end = next_line + take;
            let mut height = lead + take as f32 * lh;
            if end == total {
                height += text.trail;
            }
            placements.push(Placement {
                page: cursor.page,
                block: index,
                y: cursor.y,
                lines: next_line..end,
            });
            next_line = end;
            cursor = cursor.advance(height);
            if next_line < total {
                cursor = cursor.next_page(geo);
            }
        }

        Step {
            cursor,
            placements,
            warning: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{BlockKind, ColorRole, GroupId, TextStyle};

    fn geo() -> PageGeometry {
        PageGeometry::from_config(&LayoutConfig::default())
    }

    fn text_block(kind: BlockKind, lines: usize, trail: f32, group: Option<usize>) -> RenderBlock {
        RenderBlock {
            kind,
            content: BlockContent::Text(TextContent {
                lines: (0..lines).map(|i| format!("line {i}")).collect(),
                style: TextStyle {
                    font_size: 10.0,
                    bold: false,
                    color: ColorRole::Body,
                },
                indent: 0.0,
                bullet: kind == BlockKind::BulletItem,
                lead: 0.0,
                trail,
            }),
            height: lines as f32 * 14.0 + trail,
            group: group.map(GroupId),
            keep_with_next: false,
        }
    }

    fn spacer(height: f32) -> RenderBlock {
        RenderBlock {
            kind: BlockKind::Divider,
            content: BlockContent::Rule { offset: 0.0 },
            height,
            group: None,
            keep_with_next: false,
        }
    }

    fn entry(group: usize, bullets: usize, bullet_lines: usize) -> Vec<RenderBlock> {
        let mut blocks = vec![
            text_block(BlockKind::EntryHeader, 1, 2.0, Some(group)),
            text_block(BlockKind::EntryMeta, 1, 8.0, Some(group)),
        ];
        blocks.extend(
            (0..bullets).map(|_| text_block(BlockKind::BulletItem, bullet_lines, 4.0, Some(group))),
        );
        blocks
    }

    fn assert_monotonic(plan: &PagePlan) {
        for pair in plan.placements.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!((a.page, a.y) <= (b.page, b.y), "{a:?} then {b:?}");
        }
    }

    #[test]
    fn empty_input_is_one_page() {
        let (plan, warnings) = super::plan(&[], &geo());
        assert_eq!(plan.page_count, 1);
        assert!(plan.placements.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn blocks_that_fit_stay_on_first_page() {
        let blocks = vec![spacer(100.0), text_block(BlockKind::Paragraph, 3, 0.0, None)];
        let (plan, _) = super::plan(&blocks, &geo());
        assert_eq!(plan.page_count, 1);
        assert_eq!(plan.placements[1].y, 54.0 + 100.0);
    }

    #[test]
    fn bullets_are_never_split() {
        let g = geo();
        // Leave room for two lines of a three line bullet.
        let blocks = vec![
            spacer(g.content_height() - 30.0),
            text_block(BlockKind::BulletItem, 3, 4.0, None),
        ];
        let (plan, _) = super::plan(&blocks, &g);
        assert_eq!(plan.placements.len(), 2);
        assert_eq!(plan.placements[1].page, 1);
        assert_eq!(plan.placements[1].lines, 0..3);
    }

    #[test]
    fn paragraphs_split_between_lines() {
        let g = geo();
        let blocks = vec![
            spacer(g.content_height() - 14.0 * 4.0),
            text_block(BlockKind::Paragraph, 10, 0.0, None),
        ];
        let (plan, warnings) = super::plan(&blocks, &g);
        assert!(warnings.is_empty());
        let parts: Vec<_> = plan.placements.iter().filter(|p| p.block == 1).collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].lines, 0..4);
        assert_eq!(parts[1].lines, 4..10);
        assert_eq!(parts[1].y, g.top);
    }

    #[test]
    fn split_keeps_two_lines_together() {
        let g = geo();
        // Room for one line only: the paragraph moves whole.
        let blocks = vec![
            spacer(g.content_height() - 20.0),
            text_block(BlockKind::Paragraph, 5, 0.0, None),
        ];
        let (plan, _) = super::plan(&blocks, &g);
        assert_eq!(plan.placements[1].page, 1);
        assert_eq!(plan.placements[1].lines, 0..5);
    }

    #[test]
    fn entry_pushed_when_little_room_remains() {
        let g = geo();
        // 15% of the page left; the entry itself would fit.
        let remaining = g.content_height() * 0.15;
        let mut blocks = vec![spacer(g.content_height() - remaining)];
        let entry_blocks = entry(1, 1, 1);
        let entry_height: f32 = entry_blocks.iter().map(|b| b.height).sum();
        assert!(entry_height < remaining);
        blocks.extend(entry_blocks);
        let (plan, _) = super::plan(&blocks, &g);
        assert!(plan.placements[1..].iter().all(|p| p.page == 1));
        assert_eq!(plan.placements[1].y, g.top);
    }

    #[test]
    fn entry_pushed_when_safety_buffer_is_violated() {
        let g = geo();
        let entry_blocks = entry(1, 2, 2);
        let estimate: f32 = entry_blocks.iter().map(|b| b.height).sum();
        // Fits physically with 50pt spare, but the buffer wants 84pt.
        let mut blocks = vec![spacer(g.content_height() - estimate - 50.0)];
        blocks.extend(entry_blocks);
        let (plan, _) = super::plan(&blocks, &g);
        assert_eq!(plan.placements[1].page, 1);
    }

    #[test]
    fn tall_entry_starts_where_its_opening_fits() {
        let g = geo();
        // Eight seven-line bullets are taller than a page.
        let mut blocks = vec![spacer(200.0)];
        blocks.extend(entry(1, 8, 7));
        let (plan, warnings) = super::plan(&blocks, &g);
        assert!(warnings.is_empty());
        assert_eq!(plan.page_count, 2);
        assert_eq!(plan.placements[1].page, 0);
        // Every bullet whole, first ones on page one, the rest on page two.
        let pages: Vec<usize> = plan.placements[3..].iter().map(|p| p.page).collect();
        assert_eq!(pages.len(), 8);
        assert!(pages.windows(2).all(|w| w[0] <= w[1]));
        assert!(pages.contains(&0) && pages.contains(&1));
        assert!(plan.placements[3..].iter().all(|p| p.lines == (0..7)));
    }

    #[test]
    fn heading_moves_with_its_first_entry() {
        let g = geo();
        let mut heading = spacer(46.0);
        heading.kind = BlockKind::Heading;
        heading.keep_with_next = true;
        let mut blocks = vec![spacer(g.content_height() - 120.0), heading];
        blocks.extend(entry(1, 3, 1));
        let (plan, _) = super::plan(&blocks, &g);
        // The entry gets pushed by its safety buffer and takes the heading along.
        assert_eq!(plan.placements[1].page, 1);
        assert_eq!(plan.placements[1].y, g.top);
        assert_eq!(plan.placements[2].page, 1);
    }

    #[test]
    fn skills_section_that_fits_is_not_pushed() {
        let g = geo();
        let mut divider = spacer(6.0);
        divider.keep_with_next = true;
        let mut heading = spacer(46.0);
        heading.kind = BlockKind::Heading;
        heading.keep_with_next = true;
        let mut label = text_block(BlockKind::Paragraph, 1, 4.0, None);
        label.keep_with_next = true;
        let content = text_block(BlockKind::Paragraph, 1, 0.0, None);

        // 120pt left: the orphan rule for entries would push this section.
        let mut blocks = vec![spacer(g.content_height() - 120.0), divider, heading, label, content];
        let section: f32 = blocks[1..].iter().map(|b| b.height).sum();
        assert!(section < 120.0);
        let (plan, _) = super::plan(&blocks, &g);
        assert_eq!(plan.page_count, 1);

        // Without room for the content, the label and heading move with it.
        blocks[0] = spacer(g.content_height() - section + 4.0);
        let (plan, _) = super::plan(&blocks, &g);
        assert_eq!(plan.page_count, 2);
        assert!(plan.placements[1..].iter().all(|p| p.page == 1));
    }

    #[test]
    fn oversized_paragraph_is_split_with_warning() {
        let g = geo();
        let blocks = vec![text_block(BlockKind::Paragraph, 120, 0.0, None)];
        let (plan, warnings) = super::plan(&blocks, &g);
        assert_eq!(plan.page_count, 3);
        assert!(matches!(warnings[0], LayoutWarning::OversizedBlock { block: 0, .. }));
        let covered: usize = plan.placements.iter().map(|p| p.lines.len()).sum();
        assert_eq!(covered, 120);
    }

    #[test]
    fn planning_is_idempotent_and_monotonic() {
        let mut blocks = vec![spacer(120.0)];
        for g in 1..6 {
            blocks.extend(entry(g, 4, 3));
            blocks.push(text_block(BlockKind::Paragraph, 6, 8.0, None));
        }
        let first = super::plan(&blocks, &geo());
        let second = super::plan(&blocks, &geo());
        assert_eq!(first, second);
        assert_monotonic(&first.0);
        let placed: Vec<usize> = first.0.placements.iter().map(|p| p.block).collect();
        let expected: Vec<usize> = (0..blocks.len()).collect();
        let mut unique = placed.clone();
        unique.dedup();
        assert_eq!(unique, expected);
    }
}
