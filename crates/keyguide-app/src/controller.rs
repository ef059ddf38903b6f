//! Root UI controller.
//!
//! Wires the store to the host, the connector collector and the diagram
//! renderer. Every transaction goes through [`Controller::dispatch`]; the
//! view observer re-renders the info panel, recollects connections and
//! redraws the overlay.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::Arc;

use keyguide_core::{
    Catalog, ChangeSet, ElementTag, ElementTree, Field, InfoPanel, Observer, ParamBag, QueryConfig, QuerySync,
    Snapshot, Store, Update, UpdateQueue, collect, render_info,
};
use keyguide_render::{DiagramConfig, DiagramRenderer, RoutedLine, Surface};
use kurbo::{Point, Size};

use crate::error::{AppError, AppResult};
use crate::host::Host;

/// Everything the store observer touches.
struct View<H: Host, S: Surface> {
    host: H,
    diagram: DiagramRenderer<S>,
    panel: Option<InfoPanel>,
    /// Fatal error raised during notification, picked up by the controller.
    failure: Option<AppError>,
}

impl<H: Host, S: Surface> View<H, S> {
    /// Re-render the info panel. Returns the connection update when the
    /// collected set differs from the stored one.
    fn refresh_info(&mut self, snapshot: &Snapshot<'_>) -> Option<Update> {
        let panel = render_info(snapshot);
        self.host.show_info(&panel);
        self.panel = Some(panel);

        let collection = collect(snapshot, &self.host);
        (collection.connections.as_slice() != snapshot.connections())
            .then(|| Update::new().connections(collection.connections))
    }

    /// Resolve the connections against the host as it is laid out now.
    fn redraw(&mut self, snapshot: &Snapshot<'_>) -> AppResult<()> {
        let layout = self.host.diagram_layout();
        let debug = snapshot.debug() > 0;
        self.diagram.render(layout, snapshot.connections(), &self.host, debug)?;
        Ok(())
    }

    fn resize(&mut self, size: Size, snapshot: &Snapshot<'_>) -> AppResult<()> {
        let layout = self.host.diagram_layout();
        let debug = snapshot.debug() > 0;
        self.diagram
            .resize_and_render(size, layout, snapshot.connections(), &self.host, debug)?;
        Ok(())
    }

    fn handle(&mut self, snapshot: &Snapshot<'_>, changes: &ChangeSet, queue: &mut UpdateQueue) {
        if changes.contains(Field::Keymap) {
            if let Err(err) = self.host.show_keyboard(snapshot.keymap()) {
                log::error!("{}", err);
                self.failure = Some(err);
                return;
            }
        }
        if changes.affects_info() {
            if let Some(update) = self.refresh_info(snapshot) {
                // Redraw once the new connections land.
                queue.push(update);
                return;
            }
        }
        // The renderer leaves a clean overlay behind a failed draw.
        if let Err(err) = self.redraw(snapshot) {
            self.failure = Some(err);
        }
    }
}

struct ViewObserver<H: Host, S: Surface>(Rc<RefCell<View<H, S>>>);

impl<H: Host, S: Surface> Observer for ViewObserver<H, S> {
    fn notify(&mut self, snapshot: &Snapshot<'_>, changes: &ChangeSet, queue: &mut UpdateQueue) {
        self.0.borrow_mut().handle(snapshot, changes, queue);
    }
}

/// Owns the store, the host, the diagram renderer and the query parameters.
pub struct Controller<H: Host, S: Surface> {
    store: Store,
    view: Rc<RefCell<View<H, S>>>,
    params: Rc<RefCell<ParamBag>>,
}

impl<H: Host + 'static, S: Surface + 'static> Controller<H, S> {
    /// Build the UI for `catalog`, then apply the state named by `params`.
    ///
    /// Fails when the host cannot draw the initial keyboard. Query values the
    /// store rejects are logged and dropped one at a time; the rest still
    /// apply.
    pub fn new(
        catalog: Arc<Catalog>,
        host: H,
        surface: S,
        diagram: DiagramConfig,
        query: QueryConfig,
        params: ParamBag,
    ) -> AppResult<Self> {
        let mut store = Store::new(catalog.clone());
        let params = Rc::new(RefCell::new(params));
        let sync = QuerySync::new(query, params.clone());
        let mut initial = sync.initial_update(&catalog);

        let view = Rc::new(RefCell::new(View {
            host,
            diagram: DiagramRenderer::new(surface, diagram),
            panel: None,
            failure: None,
        }));

        let pending = {
            let snapshot = store.snapshot();
            let mut view = view.borrow_mut();
            view.host.show_keyboard(snapshot.keymap())?;
            view.refresh_info(&snapshot)
        };

        store.attach(Box::new(ViewObserver(view.clone())));
        store.attach(Box::new(sync));

        let mut controller = Self { store, view, params };
        if let Some(update) = pending {
            controller.dispatch(update)?;
        } else {
            let snapshot = controller.store.snapshot();
            controller.view.borrow_mut().redraw(&snapshot)?;
        }

        while !initial.is_empty() {
            match controller.dispatch(initial.clone()) {
                Ok(_) => break,
                Err(AppError::Update(err)) => {
                    if !initial.drop_rejected(&err) {
                        break;
                    }
                    log::info!("Retrying startup query without the rejected value");
                }
                Err(err) => return Err(err),
            }
        }
        log::info!("Controller ready on keymap '{}'", controller.store.snapshot().keymap_id());
        Ok(controller)
    }

    /// Apply one transaction and run the full render pipeline.
    pub fn dispatch(&mut self, update: Update) -> AppResult<ChangeSet> {
        let changes = self.store.apply_update(update)?;
        match self.view.borrow_mut().failure.take() {
            Some(err) => Err(err),
            None => Ok(changes),
        }
    }

    /// Select a key, as a click on it would.
    pub fn select_key(&mut self, key_id: &str) -> AppResult<ChangeSet> {
        self.dispatch(Update::new().select(key_id))
    }

    /// Select the key under `point` (page coordinates), if any.
    pub fn click(&mut self, point: Point) -> AppResult<Option<ChangeSet>> {
        let hit = {
            let view = self.view.borrow();
            view.host
                .tagged(ElementTag::PhysicalKey)
                .into_iter()
                .find(|e| e.rect.contains(point))
                .and_then(|e| e.key_id.clone())
        };
        hit.map(|key_id| self.select_key(&key_id)).transpose()
    }

    /// Advance within the active guide. No-op on the last step.
    pub fn next_step(&mut self) -> AppResult<ChangeSet> {
        let update = Update::next_step(&self.store.snapshot());
        match update {
            Some(update) => self.dispatch(update),
            None => Ok(ChangeSet::default()),
        }
    }

    /// Go back within the active guide. No-op on the first step.
    pub fn previous_step(&mut self) -> AppResult<ChangeSet> {
        let update = Update::previous_step(&self.store.snapshot());
        match update {
            Some(update) => self.dispatch(update),
            None => Ok(ChangeSet::default()),
        }
    }

    /// The overlay's container changed size.
    ///
    /// Anchors are resolved again, so lines follow a host that reflowed.
    pub fn resize(&mut self, width: f64, height: f64) -> AppResult<()> {
        let snapshot = self.store.snapshot();
        self.view.borrow_mut().resize(Size::new(width, height), &snapshot)
    }

    /// Size of the overlay as laid out by the host.
    pub fn overlay_size(&self) -> Size {
        self.view.borrow().host.diagram_layout().overlay.size()
    }

    /// Current query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        self.params.borrow().to_query_string()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        self.store.snapshot()
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn host(&self) -> Ref<'_, H> {
        Ref::map(self.view.borrow(), |v| &v.host)
    }

    /// Mutable host access. Changes show up on the next resize or update.
    pub fn host_mut(&self) -> RefMut<'_, H> {
        RefMut::map(self.view.borrow_mut(), |v| &mut v.host)
    }

    pub fn surface(&self) -> Ref<'_, S> {
        Ref::map(self.view.borrow(), |v| v.diagram.surface())
    }

    /// Info panel currently shown.
    pub fn panel(&self) -> Option<InfoPanel> {
        self.view.borrow().panel.clone()
    }

    /// Connector lines of the last completed overlay frame.
    pub fn lines(&self) -> Vec<RoutedLine> {
        self.view.borrow().diagram.lines().to_vec()
    }
}
