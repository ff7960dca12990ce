use crate::style::Paint;
use crate::tree::{PropValue, Props, StyleContext};

/// Merges `css` into `agg`, selector by selector. A selector block in `css`
/// replaces the block of the same key in `agg`.
pub fn agg_css(agg: &mut Props, css: &Props) {
    for (selector, block) in css.iter() {
        agg.set(selector, block.clone());
    }
}

/// Identity of a node as seen by selectors.
#[derive(Debug, Clone, Copy)]
pub struct SelectorTarget<'a> {
    pub type_name: &'a str,
    pub class: &'a str,
    pub name: &'a str,
}

/// Applies the rules of `css` that match `target`: type first, then each
/// class in order, then `#name`. Later matches override earlier ones.
pub fn style_css(
    paint: &mut Paint,
    parent: Option<&Paint>,
    target: SelectorTarget<'_>,
    css: &Props,
    ctx: &StyleContext<'_>,
) {
    if css.is_empty() {
        return;
    }
    apply_css(paint, parent, &target.type_name.to_lowercase(), css, ctx);
    for class in target.class.split_whitespace() {
        apply_css(paint, parent, &format!(".{}", class.to_lowercase()), css, ctx);
    }
    if !target.name.is_empty() {
        apply_css(paint, parent, &format!("#{}", target.name.to_lowercase()), css, ctx);
    }
}

/// Applies the block stored under `key`. Returns false when there is no such
/// block or the entry is not a property group.
pub fn apply_css(
    paint: &mut Paint,
    parent: Option<&Paint>,
    key: &str,
    css: &Props,
    ctx: &StyleContext<'_>,
) -> bool {
    let Some(PropValue::Group(block)) = css.get(key) else {
        return false;
    };
    paint.set_style_props(parent, block, ctx);
    true
}

#[cfg(test)]
mod tests {
    use super::agg_css;
    use crate::tree::{PropValue, Props};

    #[test]
    fn own_block_replaces_inherited_block_per_selector() {
        let mut agg = Props::new()
            .with(".g1", Props::new().with("fill", "red").with("stroke", "black"))
            .with("rect", Props::new().with("fill", "green"));
        let own = Props::new().with(".g1", Props::new().with("fill", "blue"));
        agg_css(&mut agg, &own);

        let g1 = agg.get(".g1").and_then(PropValue::as_group).expect("g1 block");
        assert_eq!(g1.get("fill").and_then(PropValue::as_str), Some("blue"));
        assert!(g1.get("stroke").is_none());
        assert!(agg.contains_key("rect"));
    }
}
