use super::html::{escape_attr_value, is_void_tag, parse_into};
use super::selector::{ElementTree, SelectorList};
use super::*;

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LayoutBox {
    pub(crate) top: f64,
    pub(crate) left: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) value: String,
    pub(crate) default_value: String,
    pub(crate) checked: bool,
    pub(crate) default_checked: bool,
    pub(crate) layout: LayoutBox,
}

impl Element {
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.attrs.iter_mut().find(|(key, _)| key == name) {
            slot.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| key != name);
    }

    fn is_checkable(&self) -> bool {
        self.tag_name == "input"
            && matches!(
                self.attr("type").map(str::to_ascii_lowercase).as_deref(),
                Some("checkbox") | Some("radio")
            )
    }
}

/// Node store backing [`MockDom`]. Ids are never reused, so a handle to a
/// removed node stays dead instead of aliasing a newer one.
#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: HashMap<NodeId, Node>,
    pub(crate) root: NodeId,
    next_id: usize,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: HashMap::from([(NodeId(0), root)]),
            root: NodeId(0),
            next_id: 1,
            id_index: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                parent,
                children: Vec::new(),
                node_type,
            },
        );
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            parent.children.push(id);
        }
        id
    }

    fn children(&self, node_id: NodeId) -> &[NodeId] {
        match self.nodes.get(&node_id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        let mut element = Element {
            tag_name,
            attrs,
            value: String::new(),
            default_value: String::new(),
            checked: false,
            default_checked: false,
            layout: LayoutBox::default(),
        };
        element.default_value = element.attr("value").unwrap_or_default().to_string();
        element.value = element.default_value.clone();
        element.default_checked = element.attr("checked").is_some();
        element.checked = element.default_checked;
        let id_attr = element.attr("id").map(str::to_string);
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = id_attr {
            self.id_index.entry(id_attr).or_insert(id);
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(&node_id)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(&node_id)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_or_err(&self, node_id: NodeId, what: &str) -> Result<&Element> {
        self.element(node_id)
            .ok_or_else(|| Error::Dom(format!("{what} target is not an element")))
    }

    fn element_mut_or_err(&mut self, node_id: NodeId, what: &str) -> Result<&mut Element> {
        self.element_mut(node_id)
            .ok_or_else(|| Error::Dom(format!("{what} target is not an element")))
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(&node_id)?.parent
    }

    /// Textareas take their default value from their text.
    pub(crate) fn sync_default_value(&mut self, node_id: NodeId) {
        if self.tag_name(node_id) != Some("textarea") {
            return;
        }
        let text = self.text_content(node_id);
        if let Some(element) = self.element_mut(node_id) {
            element.default_value = text.clone();
            element.value = text;
        }
    }

    pub(crate) fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn is_connected(&self, node_id: NodeId) -> bool {
        node_id == self.root || self.is_descendant_of(node_id, self.root)
    }

    pub(crate) fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            if self.element(node_id).is_some() {
                out.push(node_id);
            }
            for child in self.children(node_id) {
                self.collect_elements_dfs(*child, out);
            }
        })
    }

    fn collect_elements_descendants_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(node_id) {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn find_first_by_tag(&self, tag: &str) -> Option<NodeId> {
        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        ids.into_iter()
            .find(|id| self.tag_name(*id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
    }

    pub(crate) fn rebuild_id_index(&mut self) {
        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        self.id_index.clear();
        for node in ids {
            if let Some(id) = self.element(node).and_then(|e| e.attr("id")) {
                let id = id.to_string();
                self.id_index.entry(id).or_insert(node);
            }
        }
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index
            .get(id)
            .copied()
            .filter(|node| self.is_connected(*node))
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        if let Some(id) = list.single_id() {
            return Ok(self.by_id(id).into_iter().collect());
        }
        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        Ok(self.filter_matching(ids, &list))
    }

    fn filter_matching(&self, candidates: Vec<NodeId>, list: &SelectorList) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|candidate| list.matches(self, *candidate) && seen.insert(*candidate))
            .collect()
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub(crate) fn closest(&self, node_id: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        let mut cursor = self.element(node_id).map(|_| node_id);
        while let Some(current) = cursor {
            if list.matches(self, current) {
                return Ok(Some(current));
            }
            cursor = self.parent_element(current);
        }
        Ok(None)
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            match self.nodes.get(&node_id).map(|node| &node.node_type) {
                Some(NodeType::Document | NodeType::Element(_)) => self
                    .children(node_id)
                    .iter()
                    .map(|child| self.text_content(*child))
                    .collect(),
                Some(NodeType::Text(text)) => text.clone(),
                None => String::new(),
            }
        })
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            match self.nodes.get(&node_id).map(|node| &node.node_type) {
                None => String::new(),
                Some(NodeType::Document) => self.dump_children(node_id),
                Some(NodeType::Text(text)) => text.clone(),
                Some(NodeType::Element(element)) => {
                    let mut out = format!("<{}", element.tag_name);
                    for (name, value) in &element.attrs {
                        out.push_str(&format!(" {name}=\"{}\"", escape_attr_value(value)));
                    }
                    out.push('>');
                    if is_void_tag(&element.tag_name) {
                        return out;
                    }
                    out.push_str(&self.dump_children(node_id));
                    out.push_str(&format!("</{}>", element.tag_name));
                    out
                }
            }
        })
    }

    fn dump_children(&self, node_id: NodeId) -> String {
        self.children(node_id)
            .iter()
            .map(|child| self.dump_node(*child))
            .collect()
    }

    /// Removes the children of `node_id` and their subtrees from the store.
    fn remove_children(&mut self, node_id: NodeId) {
        let mut pending = match self.nodes.get_mut(&node_id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.nodes.remove(&child) {
                pending.extend(removed.children);
            }
        }
    }

    pub(crate) fn inner_html(&self, node_id: NodeId) -> Result<String> {
        self.element_or_err(node_id, "innerHTML")?;
        Ok(self.dump_children(node_id))
    }

    pub(crate) fn set_inner_html(&mut self, node_id: NodeId, html: &str) -> Result<()> {
        self.element_or_err(node_id, "innerHTML")?;
        self.remove_children(node_id);
        parse_into(self, node_id, html)?;
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn set_text_content(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        self.element_or_err(node_id, "textContent")?;
        self.remove_children(node_id);
        if !value.is_empty() {
            self.create_text(node_id, value.to_string());
        }
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)?.attr(name).map(str::to_string)
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        self.element_mut_or_err(node_id, "setAttribute")?
            .set_attr(name, value);
        if name == "id" {
            self.rebuild_id_index();
        }
        Ok(())
    }

    pub(crate) fn remove_attr(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        self.element_mut_or_err(node_id, "removeAttribute")?
            .remove_attr(name);
        if name == "id" {
            self.rebuild_id_index();
        }
        Ok(())
    }

    pub(crate) fn class_contains(&self, node_id: NodeId, class_name: &str) -> Result<bool> {
        let element = self.element_or_err(node_id, "classList")?;
        Ok(has_class(element, class_name))
    }

    pub(crate) fn class_add(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self.element_mut_or_err(node_id, "classList")?;
        let mut classes = class_tokens(element.attr("class"));
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        element.set_attr("class", &classes.join(" "));
        Ok(())
    }

    pub(crate) fn class_remove(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self.element_mut_or_err(node_id, "classList")?;
        if element.attr("class").is_none() {
            return Ok(());
        }
        let mut classes = class_tokens(element.attr("class"));
        classes.retain(|name| name != class_name);
        element.set_attr("class", &classes.join(" "));
        Ok(())
    }

    pub(crate) fn style_get(&self, node_id: NodeId, property: &str) -> Result<String> {
        let element = self.element_or_err(node_id, "style")?;
        let decls = parse_style_declarations(element.attr("style"));
        Ok(decls
            .into_iter()
            .find(|(prop, _)| prop == property)
            .map(|(_, value)| value)
            .unwrap_or_default())
    }

    pub(crate) fn style_set(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        let element = self.element_mut_or_err(node_id, "style")?;
        let mut decls = parse_style_declarations(element.attr("style"));
        if let Some(pos) = decls.iter().position(|(prop, _)| prop == property) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((property.to_string(), value.to_string()));
        }

        // An emptied declaration block still leaves `style=""` behind.
        element.set_attr("style", &serialize_style_declarations(&decls));
        Ok(())
    }

    pub(crate) fn reset_form(&mut self, form: NodeId) -> Result<()> {
        if self.tag_name(form) != Some("form") {
            return Err(Error::Dom("reset target is not a form".into()));
        }
        let mut controls = Vec::new();
        self.collect_elements_descendants_dfs(form, &mut controls);
        for control in controls {
            let Some(element) = self.element_mut(control) else {
                continue;
            };
            match element.tag_name.as_str() {
                "input" if element.is_checkable() => element.checked = element.default_checked,
                "input" | "textarea" => element.value = element.default_value.clone(),
                _ => {}
            }
        }
        Ok(())
    }

    fn layout(&self, node_id: NodeId, what: &str) -> Result<LayoutBox> {
        Ok(self.element_or_err(node_id, what)?.layout)
    }
}

impl ElementTree for Dom {
    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|parent| self.element(*parent).is_some())
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        self.tag_name(node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attr(name)
    }
}

fn has_class(element: &Element, class_name: &str) -> bool {
    element
        .attr("class")
        .is_some_and(|classes| classes.split_whitespace().any(|name| name == class_name))
}

fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn parse_style_declarations(style_attr: Option<&str>) -> Vec<(String, String)> {
    let Some(style_attr) = style_attr else {
        return Vec::new();
    };

    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut paren_depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, ch) in style_attr.char_indices() {
        match (quote, ch) {
            (Some(q), _) if ch == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(ch),
            (None, '(') => paren_depth += 1,
            (None, ')') => paren_depth = paren_depth.saturating_sub(1),
            (None, ';') if paren_depth == 0 => {
                chunks.push(&style_attr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    chunks.push(&style_attr[start..]);

    chunks
        .into_iter()
        .filter_map(|chunk| {
            let (name, value) = chunk.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some((name, value.to_string()))
            }
        })
        .collect()
}

fn serialize_style_declarations(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Intersection {
    pub(crate) is_intersecting: bool,
    pub(crate) ratio: f64,
}

/// Vertical intersection of `rect` with the viewport shrunk by
/// `bottom_margin_px` at the bottom. Zero-height targets count as
/// intersecting when they sit inside or on the edge of the root.
pub(crate) fn intersect(rect: Rect, viewport_height: f64, bottom_margin_px: f64) -> Intersection {
    let root_top = 0.0;
    let root_bottom = viewport_height - bottom_margin_px;
    if rect.height <= 0.0 {
        let is_intersecting = rect.top >= root_top && rect.top <= root_bottom;
        return Intersection {
            is_intersecting,
            ratio: if is_intersecting { 1.0 } else { 0.0 },
        };
    }
    let overlap = rect.bottom().min(root_bottom) - rect.top.max(root_top);
    Intersection {
        is_intersecting: overlap > 0.0,
        ratio: (overlap / rect.height).clamp(0.0, 1.0),
    }
}

/// Targets of one `observe_intersections` call. `None` until the first
/// report, then whether the target was at or past the threshold.
#[derive(Debug, Clone)]
struct IntersectionWatch {
    options: ObserverOptions,
    targets: Vec<(NodeId, Option<bool>)>,
}

/// In-memory page used by [`PortfolioHarness`](crate::PortfolioHarness) and
/// by tests that drive [`PortfolioEffects`](crate::PortfolioEffects)
/// directly.
///
/// There is no layout engine: element boxes default to zero and are set
/// explicitly with [`MockDom::set_layout`]. Box positions are document
/// offsets, so the client rect is the box shifted by the scroll position.
/// Intersection observers are checked against that geometry whenever
/// [`MockDom::take_intersections`] runs.
#[derive(Debug, Clone)]
pub struct MockDom {
    pub(crate) dom: Dom,
    viewport: Viewport,
    scroll_requests: Vec<f64>,
    observers: Vec<IntersectionWatch>,
}

impl MockDom {
    pub fn from_html(html: &str) -> Result<Self> {
        let mut dom = Dom::new();
        let root = dom.root;
        parse_into(&mut dom, root, html)?;
        if dom.find_first_by_tag("body").is_none() {
            wrap_in_document_shell(&mut dom);
        }
        dom.rebuild_id_index();
        Ok(Self {
            dom,
            viewport: Viewport::default(),
            scroll_requests: Vec::new(),
            observers: Vec::new(),
        })
    }

    pub fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector_all(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::SelectorNotFound(selector.into()))
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    /// Moves the document scroll position without any smooth animation.
    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.viewport.scroll_y = scroll_y.max(0.0);
    }

    pub fn set_layout(&mut self, node: NodeId, top: f64, height: f64) -> Result<()> {
        let element = self.dom.element_mut_or_err(node, "layout")?;
        element.layout.top = top;
        element.layout.height = height;
        if element.layout.width == 0.0 {
            element.layout.width = self.viewport.width;
        }
        Ok(())
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.dom.text_content(node)
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        self.dom.dump_node(node)
    }

    pub fn style(&self, node: NodeId, property: &str) -> Result<String> {
        self.dom.style_get(node, property)
    }

    pub fn value(&self, node: NodeId) -> Result<String> {
        Ok(self.dom.element_or_err(node, "value")?.value.clone())
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) -> Result<()> {
        self.dom.element_mut_or_err(node, "value")?.value = value.to_string();
        Ok(())
    }

    pub fn checked(&self, node: NodeId) -> Result<bool> {
        Ok(self.dom.element_or_err(node, "checked")?.checked)
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<()> {
        self.dom.element_mut_or_err(node, "checked")?.checked = checked;
        Ok(())
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.dom.attr(node, "disabled").is_some()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.dom.tag_name(node)
    }

    /// Smooth-scroll targets in the order they were requested.
    pub fn scroll_requests(&self) -> &[f64] {
        &self.scroll_requests
    }

    /// The observer check a browser runs on each rendering step. Every
    /// observed target is measured against the current viewport; a target
    /// is reported on its first check and afterwards only when it crosses
    /// the threshold. Targets no longer in the page are skipped.
    pub fn take_intersections(&mut self) -> Vec<IntersectionEntry> {
        let mut observers = std::mem::take(&mut self.observers);
        let mut entries = Vec::new();
        for watch in &mut observers {
            let options = watch.options;
            for (target, reported) in &mut watch.targets {
                if !self.dom.is_connected(*target) {
                    continue;
                }
                let Ok(rect) = self.bounding_client_rect(*target) else {
                    continue;
                };
                let hit = intersect(rect, self.viewport.height, options.bottom_margin_px);
                let past_threshold = hit.is_intersecting && hit.ratio >= options.threshold;
                if *reported == Some(past_threshold) {
                    continue;
                }
                *reported = Some(past_threshold);
                entries.push(IntersectionEntry {
                    target: *target,
                    is_intersecting: hit.is_intersecting,
                    ratio: hit.ratio,
                });
            }
        }
        self.observers = observers;
        entries
    }
}

fn wrap_in_document_shell(dom: &mut Dom) {
    let root = dom.root;
    let top_level = dom
        .nodes
        .get_mut(&root)
        .map(|node| std::mem::take(&mut node.children))
        .unwrap_or_default();
    let html = dom.create_element(root, "html".into(), Vec::new());
    dom.create_element(html, "head".into(), Vec::new());
    let body = dom.create_element(html, "body".into(), Vec::new());
    for child in &top_level {
        if let Some(node) = dom.nodes.get_mut(child) {
            node.parent = Some(body);
        }
    }
    if let Some(body) = dom.nodes.get_mut(&body) {
        body.children.extend(top_level);
    }
}

impl PageDom for MockDom {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.dom.by_id(id)
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all(selector)
    }

    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>> {
        self.dom.closest(node, selector)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.dom.is_descendant_of(node, ancestor)
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.dom.attr(node, name)
    }

    fn class_contains(&self, node: NodeId, class_name: &str) -> Result<bool> {
        self.dom.class_contains(node, class_name)
    }

    fn class_add(&mut self, node: NodeId, class_name: &str) -> Result<()> {
        self.dom.class_add(node, class_name)
    }

    fn class_remove(&mut self, node: NodeId, class_name: &str) -> Result<()> {
        self.dom.class_remove(node, class_name)
    }

    fn style_set(&mut self, node: NodeId, property: &str, value: &str) -> Result<()> {
        self.dom.style_set(node, property, value)
    }

    fn inner_html(&self, node: NodeId) -> Result<String> {
        self.dom.inner_html(node)
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<()> {
        self.dom.set_inner_html(node, html)
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.dom.set_text_content(node, text)
    }

    fn set_disabled(&mut self, node: NodeId, disabled: bool) -> Result<()> {
        if disabled {
            self.dom.set_attr(node, "disabled", "")
        } else {
            self.dom.remove_attr(node, "disabled")
        }
    }

    fn reset_form(&mut self, form: NodeId) -> Result<()> {
        self.dom.reset_form(form)
    }

    fn offset_top(&self, node: NodeId) -> Result<f64> {
        Ok(self.dom.layout(node, "offsetTop")?.top)
    }

    fn offset_height(&self, node: NodeId) -> Result<f64> {
        Ok(self.dom.layout(node, "offsetHeight")?.height)
    }

    fn bounding_client_rect(&self, node: NodeId) -> Result<Rect> {
        let layout = self.dom.layout(node, "getBoundingClientRect")?;
        Ok(Rect {
            top: layout.top - self.viewport.scroll_y,
            left: layout.left,
            width: layout.width,
            height: layout.height,
        })
    }

    fn body(&self) -> Result<NodeId> {
        self.dom
            .find_first_by_tag("body")
            .ok_or_else(|| Error::MissingElement("body".into()))
    }

    fn append_head_style(&mut self, css: &str) -> Result<()> {
        let head = match self.dom.find_first_by_tag("head") {
            Some(head) => head,
            None => {
                let body = self.body()?;
                let parent = self.dom.parent(body).unwrap_or(self.dom.root);
                let head = self.dom.create_element(parent, "head".into(), Vec::new());
                // Heads go before the body.
                if let Some(parent) = self.dom.nodes.get_mut(&parent) {
                    let children = &mut parent.children;
                    children.retain(|id| *id != head);
                    let at = children.iter().position(|id| *id == body).unwrap_or(0);
                    children.insert(at, head);
                }
                head
            }
        };
        let style = self.dom.create_element(head, "style".into(), Vec::new());
        self.dom.create_text(style, css.to_string());
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn observe_intersections(&mut self, targets: &[NodeId], options: ObserverOptions) -> Result<()> {
        for target in targets {
            self.dom.element_or_err(*target, "IntersectionObserver.observe")?;
        }
        self.observers.push(IntersectionWatch {
            options,
            targets: targets.iter().map(|target| (*target, None)).collect(),
        });
        Ok(())
    }

    fn scroll_to(&mut self, top: f64) {
        self.scroll_requests.push(top);
        self.viewport.scroll_y = top.max(0.0);
    }
}
