#![forbid(unsafe_code)]

//! Deterministic single-component host.
//!
//! [`TestComponent`] plays the part of a UI framework for one component:
//!
//! 1. `mount` renders once with fresh state, then commits: every mount effect
//!    declared during that render runs its setup, in declaration order.
//! 2. `flush` drives spawned futures until they stall and re-renders while any
//!    state slot was written. Each render output is appended to `frames`.
//! 3. `unmount` runs the cleanups and marks the activation dead. Setters from
//!    a dead activation drop their writes and count them.
//! 4. `remount` starts a brand-new activation; no state survives.
//!
//! State slots are [`Observable`] cells. A subscriber on each cell raises the
//! component's dirty flag.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use evhook_runtime::{EffectCleanup, Hooks, Observable, StateSetter, Subscription};
use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawn;
use tracing::debug;

use crate::clock::VirtualClock;

/// Setter handed out by [`TestHost::use_state`].
pub struct HostSetter<T> {
    cell: Observable<T>,
    mounted: Rc<Cell<bool>>,
    ignored: Rc<Cell<usize>>,
}

impl<T> Clone for HostSetter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            mounted: Rc::clone(&self.mounted),
            ignored: Rc::clone(&self.ignored),
        }
    }
}

impl<T: Clone + 'static> StateSetter<T> for HostSetter<T> {
    fn set(&self, value: T) {
        if self.mounted.get() {
            self.cell.set(value);
        } else {
            self.ignored.set(self.ignored.get() + 1);
            debug!("state write after unmount ignored");
        }
    }
}

struct Slot<T> {
    cell: Observable<T>,
    _watch: Subscription,
}

/// Hook context passed to the component's render function.
pub struct TestHost {
    slots: Vec<Box<dyn Any>>,
    cursor: usize,
    committed: bool,
    pending: Vec<Box<dyn FnOnce(&dyn LocalSpawn) -> EffectCleanup>>,
    cleanups: Vec<EffectCleanup>,
    dirty: Rc<Cell<bool>>,
    mounted: Rc<Cell<bool>>,
    ignored: Rc<Cell<usize>>,
    spawner: LocalSpawner,
}

impl TestHost {
    fn new(spawner: LocalSpawner) -> Self {
        Self {
            slots: Vec::new(),
            cursor: 0,
            committed: false,
            pending: Vec::new(),
            cleanups: Vec::new(),
            dirty: Rc::new(Cell::new(false)),
            mounted: Rc::new(Cell::new(false)),
            ignored: Rc::new(Cell::new(0)),
            spawner,
        }
    }

    /// Whether the current activation is live.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    fn begin_activation(&mut self) {
        self.slots.clear();
        self.pending.clear();
        self.cleanups.clear();
        self.cursor = 0;
        self.committed = false;
        self.dirty.set(false);
        self.mounted = Rc::new(Cell::new(true));
    }

    fn begin_render(&mut self) {
        self.cursor = 0;
    }

    fn commit(&mut self) {
        if self.committed {
            return;
        }
        self.committed = true;
        for setup in std::mem::take(&mut self.pending) {
            self.cleanups.push(setup(&self.spawner));
        }
    }

    fn end_activation(&mut self) {
        self.mounted.set(false);
        for cleanup in std::mem::take(&mut self.cleanups) {
            cleanup.run();
        }
    }

    fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }
}

impl Hooks for TestHost {
    type Setter<T: Clone + 'static> = HostSetter<T>;

    fn use_state<T: Clone + 'static>(&mut self, init: impl FnOnce() -> T) -> (T, HostSetter<T>) {
        if self.cursor == self.slots.len() {
            let cell = Observable::new(init());
            let dirty = Rc::clone(&self.dirty);
            let watch = cell.subscribe(move |_| dirty.set(true));
            self.slots.push(Box::new(Slot {
                cell,
                _watch: watch,
            }));
        }
        let cell = match self.slots[self.cursor].downcast_ref::<Slot<T>>() {
            Some(slot) => slot.cell.clone(),
            None => panic!(
                "use_state slot {} changed type between renders; hooks must be called unconditionally",
                self.cursor
            ),
        };
        self.cursor += 1;
        let setter = HostSetter {
            cell: cell.clone(),
            mounted: Rc::clone(&self.mounted),
            ignored: Rc::clone(&self.ignored),
        };
        (cell.get(), setter)
    }

    fn use_mount_effect(
        &mut self,
        setup: impl FnOnce(&dyn LocalSpawn) -> EffectCleanup + 'static,
    ) {
        if !self.committed {
            self.pending.push(Box::new(setup));
        }
    }
}

impl fmt::Debug for TestHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestHost")
            .field("slots", &self.slots.len())
            .field("effects", &self.cleanups.len())
            .field("mounted", &self.mounted.get())
            .finish_non_exhaustive()
    }
}

/// One component under test, plus the executor that drives its futures.
pub struct TestComponent<R> {
    host: TestHost,
    pool: LocalPool,
    render: Box<dyn FnMut(&mut TestHost) -> R>,
    frames: Vec<R>,
    activations: usize,
}

impl<R> TestComponent<R> {
    /// Mount `render` and run its first render and commit.
    pub fn mount(render: impl FnMut(&mut TestHost) -> R + 'static) -> Self {
        let pool = LocalPool::new();
        let host = TestHost::new(pool.spawner());
        let mut component = Self {
            host,
            pool,
            render: Box::new(render),
            frames: Vec::new(),
            activations: 0,
        };
        component.activate();
        component
    }

    fn activate(&mut self) {
        self.host.begin_activation();
        self.activations += 1;
        debug!(activation = self.activations, "mount");
        self.render_frame();
    }

    fn render_frame(&mut self) {
        self.host.begin_render();
        let frame = (self.render)(&mut self.host);
        self.frames.push(frame);
        self.host.commit();
    }

    /// Drive spawned futures and re-render until nothing changes.
    ///
    /// Returns the number of renders performed.
    pub fn flush(&mut self) -> usize {
        let mut renders = 0;
        loop {
            self.pool.run_until_stalled();
            if !self.host.take_dirty() || !self.host.is_mounted() {
                return renders;
            }
            self.render_frame();
            renders += 1;
        }
    }

    /// Run clock actions due up to `until_ms`, flushing after each one.
    pub fn run_clock(&mut self, clock: &mut VirtualClock, until_ms: u64) {
        while let Some(action) = clock.pop_due(until_ms) {
            action();
            self.flush();
        }
        clock.advance_to(until_ms);
    }

    /// Deactivate. A second call is a no-op.
    pub fn unmount(&mut self) {
        if !self.host.is_mounted() {
            return;
        }
        debug!(activation = self.activations, "unmount");
        self.host.end_activation();
    }

    /// Unmount if needed, then mount again with fresh state.
    pub fn remount(&mut self) {
        self.unmount();
        self.activate();
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.host.is_mounted()
    }

    /// Output of the latest render.
    #[must_use]
    pub fn current(&self) -> Option<&R> {
        self.frames.last()
    }

    /// Every render output, oldest first, across activations.
    #[must_use]
    pub fn frames(&self) -> &[R] {
        &self.frames
    }

    #[must_use]
    pub fn activations(&self) -> usize {
        self.activations
    }

    /// Writes dropped because their activation had ended.
    #[must_use]
    pub fn ignored_writes(&self) -> usize {
        self.host.ignored.get()
    }
}

impl<R> fmt::Debug for TestComponent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestComponent")
            .field("host", &self.host)
            .field("frames", &self.frames.len())
            .field("activations", &self.activations)
            .finish_non_exhaustive()
    }
}
