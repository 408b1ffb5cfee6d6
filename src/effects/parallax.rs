use super::*;

#[derive(Debug, Clone)]
pub(crate) struct ParallaxGlow {
    glows: String,
    factor: f64,
}

/// Offset of the pointer from the viewport centre, scaled by `factor`.
/// `None` for a zero-sized viewport.
pub(crate) fn pointer_offset(
    client_x: f64,
    client_y: f64,
    viewport: Viewport,
    factor: f64,
) -> Option<(f64, f64)> {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return None;
    }
    Some((
        (client_x / viewport.width - 0.5) * factor,
        (client_y / viewport.height - 0.5) * factor,
    ))
}

impl ParallaxGlow {
    pub(crate) fn new(config: &EffectsConfig) -> Self {
        Self {
            glows: config.markup.glows.clone(),
            factor: config.parallax_factor,
        }
    }

    /// Returns how many glows were moved.
    pub(crate) fn on_mouse_move(
        &self,
        dom: &mut dyn PageDom,
        client_x: f64,
        client_y: f64,
    ) -> Result<usize> {
        let Some((x, y)) = pointer_offset(client_x, client_y, dom.viewport(), self.factor) else {
            return Ok(0);
        };
        let glows = dom.query_selector_all(&self.glows)?;
        for (index, glow) in glows.iter().enumerate() {
            let sign = if index % 2 == 0 { 1.0 } else { -1.0 };
            let transform = format!(
                "translate({}px, {}px)",
                format_number(x * sign),
                format_number(y * sign)
            );
            dom.style_set(*glow, "transform", &transform)?;
        }
        Ok(glows.len())
    }
}
