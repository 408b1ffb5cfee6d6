use super::*;

mod counters_and_reveal;
mod form_and_smooth_scroll;
mod navbar_and_sections;
mod timers_and_trace;

const NAV: &str = r##"
<nav id="navbar">
  <button id="navToggle"><span class="bar"></span></button>
  <ul id="navMenu">
    <li><a class="nav-link" id="link-home" data-section="home" href="#home">Home</a></li>
    <li><a class="nav-link" id="link-about" data-section="about" href="#about">About</a></li>
    <li><a class="nav-link" id="link-work" data-section="work" href="#work">Work</a></li>
    <li><a class="nav-link" id="link-blog" href="/blog">Blog</a></li>
  </ul>
</nav>
"##;

fn page(body: &str) -> String {
    format!("{NAV}{body}")
}

/// Parses `body` under the shared navbar and applies `layout` as
/// `(selector, top, height)` before anything is attached.
fn page_dom(body: &str, layout: &[(&str, f64, f64)]) -> Result<MockDom> {
    let mut dom = MockDom::from_html(&page(body))?;
    for (selector, top, height) in layout {
        let node = dom.select_one(selector)?;
        dom.set_layout(node, *top, *height)?;
    }
    Ok(dom)
}

fn harness_with_layout(body: &str, layout: &[(&str, f64, f64)]) -> Result<PortfolioHarness> {
    PortfolioHarness::from_dom(page_dom(body, layout)?, EffectsConfig::default())
}
