use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, HtmlButtonElement, HtmlElement,
    HtmlFormElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MouseEvent, ScrollToOptions, Window,
};

use super::*;

const MIN_REGISTRY_PRUNE_AT: usize = 64;

fn js_error(err: JsValue) -> Error {
    Error::Platform(
        err.as_string()
            .or_else(|| {
                err.dyn_ref::<js_sys::Error>()
                    .map(|err| String::from(err.message()))
            })
            .unwrap_or_else(|| format!("{err:?}")),
    )
}

/// Live document behind [`PageDom`].
///
/// Elements handed out as [`NodeId`]s are kept in a registry and found
/// again through a `WeakMap` keyed by the element, so the same element maps
/// to the same id while it stays registered. Elements that have left the
/// document are dropped from the registry whenever it doubles in size.
struct WebDom {
    window: Window,
    document: Document,
    app: Weak<RefCell<WebApp>>,
    keys: js_sys::WeakMap,
    elements: RefCell<HashMap<usize, Element>>,
    next_key: Cell<usize>,
    prune_at: Cell<usize>,
    observers: Vec<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>)>,
}

impl WebDom {
    fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            app: Weak::new(),
            keys: js_sys::WeakMap::new(),
            elements: RefCell::new(HashMap::new()),
            next_key: Cell::new(0),
            prune_at: Cell::new(MIN_REGISTRY_PRUNE_AT),
            observers: Vec::new(),
        }
    }

    fn register(&self, element: Element) -> NodeId {
        let key: &js_sys::Object = element.as_ref();
        let known = self.keys.get(key).as_f64().map(|raw| raw as usize);
        if let Some(id) = known.filter(|id| self.elements.borrow().contains_key(id)) {
            return NodeId(id);
        }

        let mut elements = self.elements.borrow_mut();
        if elements.len() >= self.prune_at.get() {
            elements.retain(|_, known| known.is_connected());
            self.prune_at
                .set((elements.len() * 2).max(MIN_REGISTRY_PRUNE_AT));
        }
        let id = self.next_key.get();
        self.next_key.set(id + 1);
        self.keys.set(key, &JsValue::from_f64(id as f64));
        elements.insert(id, element);
        NodeId(id)
    }

    fn element(&self, node: NodeId) -> Result<Element> {
        self.elements
            .borrow()
            .get(&node.0)
            .cloned()
            .ok_or_else(|| Error::Dom(format!("unknown node {}", node.0)))
    }

    fn html_element(&self, node: NodeId) -> Result<HtmlElement> {
        self.element(node)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| Error::Dom(format!("node {} is not an HTML element", node.0)))
    }

    fn collect(&self, list: web_sys::NodeList) -> Vec<NodeId> {
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.register(element))
            .collect()
    }

    fn window_f64(value: std::result::Result<JsValue, JsValue>) -> f64 {
        value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0)
    }
}

impl PageDom for WebDom {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document
            .get_element_by_id(id)
            .map(|element| self.register(element))
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(js_error)?;
        Ok(self.collect(list))
    }

    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let found = self.element(node)?.closest(selector).map_err(js_error)?;
        Ok(found.map(|element| self.register(element)))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Ok(ancestor), Ok(node)) => ancestor.contains(Some(node.as_ref())),
            _ => false,
        }
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node).ok()?.get_attribute(name)
    }

    fn class_contains(&self, node: NodeId, class_name: &str) -> Result<bool> {
        Ok(self.element(node)?.class_list().contains(class_name))
    }

    fn class_add(&mut self, node: NodeId, class_name: &str) -> Result<()> {
        self.element(node)?
            .class_list()
            .add_1(class_name)
            .map_err(js_error)
    }

    fn class_remove(&mut self, node: NodeId, class_name: &str) -> Result<()> {
        self.element(node)?
            .class_list()
            .remove_1(class_name)
            .map_err(js_error)
    }

    fn class_toggle(&mut self, node: NodeId, class_name: &str) -> Result<bool> {
        self.element(node)?
            .class_list()
            .toggle(class_name)
            .map_err(js_error)
    }

    fn style_set(&mut self, node: NodeId, property: &str, value: &str) -> Result<()> {
        let style = self.html_element(node)?.style();
        if value.is_empty() {
            style.remove_property(property).map_err(js_error)?;
            Ok(())
        } else {
            style.set_property(property, value).map_err(js_error)
        }
    }

    fn inner_html(&self, node: NodeId) -> Result<String> {
        Ok(self.element(node)?.inner_html())
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<()> {
        self.element(node)?.set_inner_html(html);
        Ok(())
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.element(node)?.set_text_content(Some(text));
        Ok(())
    }

    fn set_disabled(&mut self, node: NodeId, disabled: bool) -> Result<()> {
        let element = self.element(node)?;
        if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
            return Ok(());
        }
        if disabled {
            element.set_attribute("disabled", "").map_err(js_error)
        } else {
            element.remove_attribute("disabled").map_err(js_error)
        }
    }

    fn reset_form(&mut self, form: NodeId) -> Result<()> {
        let form = self
            .element(form)?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| Error::Dom("reset target is not a form".into()))?;
        form.reset();
        Ok(())
    }

    fn offset_top(&self, node: NodeId) -> Result<f64> {
        Ok(f64::from(self.html_element(node)?.offset_top()))
    }

    fn offset_height(&self, node: NodeId) -> Result<f64> {
        Ok(f64::from(self.html_element(node)?.offset_height()))
    }

    fn bounding_client_rect(&self, node: NodeId) -> Result<Rect> {
        let rect = self.element(node)?.get_bounding_client_rect();
        Ok(Rect {
            top: rect.top(),
            left: rect.left(),
            width: rect.width(),
            height: rect.height(),
        })
    }

    fn body(&self) -> Result<NodeId> {
        let body = self
            .document
            .body()
            .ok_or_else(|| Error::MissingElement("body".into()))?;
        Ok(self.register(body.into()))
    }

    fn append_head_style(&mut self, css: &str) -> Result<()> {
        let head = self
            .document
            .head()
            .ok_or_else(|| Error::MissingElement("head".into()))?;
        let style = self.document.create_element("style").map_err(js_error)?;
        style.set_text_content(Some(css));
        head.append_child(&style).map_err(js_error)?;
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            scroll_y: self.window.scroll_y().unwrap_or(0.0),
            width: Self::window_f64(self.window.inner_width()),
            height: Self::window_f64(self.window.inner_height()),
        }
    }

    fn observe_intersections(&mut self, targets: &[NodeId], options: ObserverOptions) -> Result<()> {
        let app = self.app.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            deliver_intersections(&app, &entries);
        });
        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin());
        init.set_threshold(&JsValue::from_f64(options.threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(js_error)?;
        for target in targets {
            observer.observe(&self.element(*target)?);
        }
        self.observers.push((observer, callback));
        Ok(())
    }

    fn scroll_to(&mut self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(web_sys::ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

#[derive(Debug, Clone, Copy)]
enum BrowserHandle {
    Timeout(i32),
    Interval(i32),
    Frame(i32),
}

/// [`TimerHost`] over `setTimeout`, `setInterval` and
/// `requestAnimationFrame`. Fired tasks are routed back into the app.
struct WebTimers {
    window: Window,
    app: Weak<RefCell<WebApp>>,
    next_id: i64,
    handles: HashMap<TimerId, BrowserHandle>,
    intervals: HashMap<TimerId, Closure<dyn FnMut()>>,
    // Cleared interval callbacks may still be on the stack; dropped on the
    // next dispatch.
    retired: Vec<Closure<dyn FnMut()>>,
}

impl WebTimers {
    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn one_shot_callback(&self, id: TimerId, task: Task) -> JsValue {
        let app = self.app.clone();
        Closure::once_into_js(move || dispatch(&app, id, task))
    }

    fn delay(delay_ms: i64) -> i32 {
        i32::try_from(delay_ms.max(0)).unwrap_or(i32::MAX)
    }
}

impl TimerHost for WebTimers {
    fn set_timeout(&mut self, task: Task, delay_ms: i64) -> TimerId {
        let id = self.allocate_id();
        let callback = self.one_shot_callback(id, task);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                Self::delay(delay_ms),
            ) {
            Ok(handle) => {
                self.handles.insert(id, BrowserHandle::Timeout(handle));
            }
            Err(err) => log::warn!("setTimeout failed for {task:?}: {}", js_error(err)),
        }
        id
    }

    fn set_interval(&mut self, task: Task, interval_ms: i64) -> TimerId {
        let id = self.allocate_id();
        let app = self.app.clone();
        let callback = Closure::<dyn FnMut()>::new(move || dispatch(&app, id, task));
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                Self::delay(interval_ms),
            ) {
            Ok(handle) => {
                self.handles.insert(id, BrowserHandle::Interval(handle));
                self.intervals.insert(id, callback);
            }
            Err(err) => log::warn!("setInterval failed for {task:?}: {}", js_error(err)),
        }
        id
    }

    fn request_animation_frame(&mut self, task: Task) -> TimerId {
        let id = self.allocate_id();
        let callback = self.one_shot_callback(id, task);
        match self.window.request_animation_frame(callback.unchecked_ref()) {
            Ok(handle) => {
                self.handles.insert(id, BrowserHandle::Frame(handle));
            }
            Err(err) => log::warn!("requestAnimationFrame failed for {task:?}: {}", js_error(err)),
        }
        id
    }

    fn clear_timer(&mut self, id: TimerId) -> bool {
        let Some(handle) = self.handles.remove(&id) else {
            return false;
        };
        match handle {
            BrowserHandle::Timeout(handle) => self.window.clear_timeout_with_handle(handle),
            BrowserHandle::Interval(handle) => {
                self.window.clear_interval_with_handle(handle);
                if let Some(callback) = self.intervals.remove(&id) {
                    self.retired.push(callback);
                }
            }
            BrowserHandle::Frame(handle) => {
                if let Err(err) = self.window.cancel_animation_frame(handle) {
                    log::warn!("cancelAnimationFrame failed: {}", js_error(err));
                }
            }
        }
        true
    }
}

struct WebApp {
    dom: WebDom,
    timers: WebTimers,
    effects: Option<PortfolioEffects>,
}

fn dispatch(app: &Weak<RefCell<WebApp>>, id: TimerId, task: Task) {
    let Some(app) = app.upgrade() else {
        return;
    };
    with_app(&app, "timer", |effects, dom, timers| {
        timers.retired.clear();
        if !matches!(timers.handles.get(&id), Some(BrowserHandle::Interval(_))) {
            timers.handles.remove(&id);
        }
        effects.run_task(task, dom, timers)
    });
}

fn deliver_intersections(app: &Weak<RefCell<WebApp>>, entries: &js_sys::Array) {
    let Some(app) = app.upgrade() else {
        return;
    };
    with_app(&app, "intersection", |effects, dom, _| {
        let entries = entries
            .iter()
            .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
            .map(|entry| IntersectionEntry {
                target: dom.register(entry.target()),
                is_intersecting: entry.is_intersecting(),
                ratio: entry.intersection_ratio(),
            })
            .collect::<Vec<_>>();
        effects.on_intersections(dom, &entries)
    });
}

fn with_app<T>(
    app: &Rc<RefCell<WebApp>>,
    what: &str,
    run: impl FnOnce(&mut PortfolioEffects, &mut WebDom, &mut WebTimers) -> Result<T>,
) -> Option<T> {
    let Ok(mut app) = app.try_borrow_mut() else {
        log::warn!("{what} handler re-entered; skipped");
        return None;
    };
    let WebApp {
        dom,
        timers,
        effects,
    } = &mut *app;
    let effects = effects.as_mut()?;
    match run(effects, dom, timers) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("{what} handler failed: {err}");
            None
        }
    }
}

fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
    target: &web_sys::EventTarget,
    event: &str,
    passive: bool,
    handler: impl FnMut(E) + 'static,
) -> Result<()> {
    let callback = Closure::<dyn FnMut(E)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(js_error)?;
    // Listeners live as long as the page.
    callback.forget();
    Ok(())
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn boot(window: Window, document: Document) -> Result<()> {
    let app = Rc::new(RefCell::new(WebApp {
        dom: WebDom::new(window.clone(), document.clone()),
        timers: WebTimers {
            window: window.clone(),
            app: Weak::new(),
            next_id: 1,
            handles: HashMap::new(),
            intervals: HashMap::new(),
            retired: Vec::new(),
        },
        effects: None,
    }));
    {
        let mut state = app.borrow_mut();
        state.timers.app = Rc::downgrade(&app);
        state.dom.app = Rc::downgrade(&app);
        let WebApp { dom, timers, .. } = &mut *state;
        let effects = PortfolioEffects::attach(dom, timers, EffectsConfig::default())?;
        state.effects = Some(effects);
    }

    let handle = app.clone();
    listen(window.as_ref(), "scroll", true, move |_: Event| {
        with_app(&handle, "scroll", |effects, dom, timers| {
            effects.on_scroll(dom, timers)
        });
    })?;

    let handle = app.clone();
    listen(window.as_ref(), "mousemove", true, move |event: MouseEvent| {
        let (x, y) = (f64::from(event.client_x()), f64::from(event.client_y()));
        with_app(&handle, "mousemove", |effects, dom, _| {
            effects.on_mouse_move(dom, x, y)
        });
    })?;

    let handle = app.clone();
    listen(document.as_ref(), "click", false, move |event: Event| {
        let Some(target) = event_element(&event) else {
            return;
        };
        let outcome = with_app(&handle, "click", |effects, dom, _| {
            let node = dom.register(target);
            effects.on_click(dom, node)
        });
        if outcome.is_some_and(|outcome| outcome.default_prevented) {
            event.prevent_default();
        }
    })?;

    let handle = app;
    listen(document.as_ref(), "submit", false, move |event: Event| {
        let Some(target) = event_element(&event) else {
            return;
        };
        let outcome = with_app(&handle, "submit", |effects, dom, timers| {
            let node = dom.register(target);
            effects.on_submit(dom, timers, node)
        });
        if outcome.is_some_and(|outcome| outcome.default_prevented) {
            event.prevent_default();
        }
    })?;

    log::debug!("portfolio effects attached");
    Ok(())
}

/// Attaches the page effects once the document has been parsed.
#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    let to_js = |err: Error| JsValue::from(js_sys::Error::new(&err.to_string()));
    let window = web_sys::window().ok_or_else(|| to_js(Error::Platform("no window".into())))?;
    let document = window
        .document()
        .ok_or_else(|| to_js(Error::Platform("no document".into())))?;

    if document.ready_state() != "loading" {
        return boot(window, document).map_err(to_js);
    }

    let target = document.clone();
    let on_ready = Closure::once_into_js(move || {
        if let Err(err) = boot(window, document) {
            log::error!("failed to attach portfolio effects: {err}");
        }
    });
    target
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
        .map_err(|err| to_js(js_error(err)))
}
