//! Inline styles for rendered cards.
//!
//! Exported HTML has no stylesheet, so every element carries its own style.

pub const WRAPPER_STYLE: &str = concat!(
    "font-family: ui-monospace, 'SF Mono', 'Menlo', 'Monaco', 'Cascadia Mono', 'Consolas', monospace; ",
    "font-size: 14px; line-height: 1.5; color: #4c4f69; text-align: left;"
);
pub const PRE_STYLE: &str =
    "background: #eff1f5; padding: 12px 16px; border-radius: 8px; overflow-x: auto; margin: 8px 0;";
pub const CODE_STYLE: &str = concat!(
    "font-family: ui-monospace, 'SF Mono', 'Menlo', 'Monaco', 'Cascadia Mono', 'Consolas', monospace; ",
    "font-size: 14px;"
);
pub const INLINE_CODE_STYLE: &str = concat!(
    "font-family: ui-monospace, 'SF Mono', 'Menlo', 'Monaco', 'Cascadia Mono', 'Consolas', monospace; ",
    "background: #e6e9ef; padding: 2px 6px; border-radius: 4px; font-size: 0.9em;"
);
pub const HR_STYLE: &str = "border: none; border-top: 1px solid #ccd0da; margin: 12px 0;";
pub const PARAGRAPH_STYLE: &str = "margin: 8px 0;";

// Preview only
pub const CLOZE_STYLE: &str = "background: #dce0e8; border-radius: 3px;";
pub const BADGE_STYLE: &str = "background: #8839ef; color: #eff1f5; border-radius: 4px; padding: 0 4px; margin-right: 2px; font-size: 0.75em; font-weight: 700;";
pub const HINT_STYLE: &str = "color: #8c8fa1; font-style: italic;";
pub const HIDDEN_STYLE: &str = "background: #1e66f5; color: #eff1f5; border-radius: 4px; padding: 0 4px; font-weight: 700;";
pub const REVEALED_STYLE: &str = "color: #1e66f5; font-weight: 700; background: #dce0e8;";
