use super::*;

const VISIBLE_CLASS: &str = "visible";

#[derive(Debug, Clone, Copy)]
struct Observed {
    node: NodeId,
    revealed: bool,
}

/// One-way reveal of `.animate-on-scroll` elements.
///
/// Targets are handed to the page's intersection observer at attach time.
/// Any entry that reports its target as intersecting adds `visible`; the
/// class is never taken away and targets stay observed.
#[derive(Debug, Clone)]
pub(crate) struct RevealAnimator {
    targets: Vec<Observed>,
    options: ObserverOptions,
}

impl RevealAnimator {
    pub(crate) fn resolve(dom: &dyn PageDom, config: &EffectsConfig) -> Result<Self> {
        let targets = dom
            .query_selector_all(&config.markup.reveal_targets)?
            .into_iter()
            .map(|node| Observed {
                node,
                revealed: false,
            })
            .collect();
        Ok(Self {
            targets,
            options: ObserverOptions {
                bottom_margin_px: config.reveal_bottom_margin_px,
                threshold: config.reveal_threshold,
            },
        })
    }

    pub(crate) fn observe(&self, dom: &mut dyn PageDom) -> Result<()> {
        if self.targets.is_empty() {
            return Ok(());
        }
        let nodes = self
            .targets
            .iter()
            .map(|target| target.node)
            .collect::<Vec<_>>();
        dom.observe_intersections(&nodes, self.options)
    }

    pub(crate) fn revealed_count(&self) -> usize {
        self.targets.iter().filter(|target| target.revealed).count()
    }

    /// Returns how many targets these entries revealed. Entries for
    /// elements that are not targets are ignored.
    pub(crate) fn apply(
        &mut self,
        dom: &mut dyn PageDom,
        entries: &[IntersectionEntry],
    ) -> Result<usize> {
        let mut newly_revealed = 0;
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            let Some(target) = self
                .targets
                .iter_mut()
                .find(|target| target.node == entry.target && !target.revealed)
            else {
                continue;
            };
            dom.class_add(target.node, VISIBLE_CLASS)?;
            target.revealed = true;
            newly_revealed += 1;
        }
        Ok(newly_revealed)
    }
}
