use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::ptr;

use rust_feedforward::{Error, Network};

/// Counts heap traffic on the thread that armed it, and can fail one allocation.
struct CountingAlloc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AllocSnapshot {
    allocs: usize,
    reallocs: usize,
    deallocs: usize,
    failed: usize,
}

impl AllocSnapshot {
    const ZERO: Self = Self {
        allocs: 0,
        reallocs: 0,
        deallocs: 0,
        failed: 0,
    };
}

thread_local! {
    static ARMED: Cell<bool> = const { Cell::new(false) };
    static STATS: Cell<AllocSnapshot> = const { Cell::new(AllocSnapshot::ZERO) };
    /// Index (among successful allocations) of the one to refuse.
    static FAIL_AT: Cell<Option<usize>> = const { Cell::new(None) };
}

fn update(f: impl FnOnce(&mut AllocSnapshot)) {
    let _ = STATS.try_with(|stats| {
        let mut s = stats.get();
        f(&mut s);
        stats.set(s);
    });
}

fn armed() -> bool {
    ARMED.try_with(Cell::get).unwrap_or(false)
}

/// Records an allocation request; returns `false` if it must be refused.
fn admit_alloc() -> bool {
    if !armed() {
        return true;
    }
    let allocs = STATS.try_with(|s| s.get().allocs).unwrap_or(0);
    if FAIL_AT.try_with(Cell::get).ok().flatten() == Some(allocs) {
        let _ = FAIL_AT.try_with(|slot| slot.set(None));
        update(|s| s.failed += 1);
        return false;
    }
    update(|s| s.allocs += 1);
    true
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if !admit_alloc() {
            return ptr::null_mut();
        }
        unsafe { System.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if !admit_alloc() {
            return ptr::null_mut();
        }
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if armed() {
            update(|s| s.deallocs += 1);
        }
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if armed() {
            update(|s| s.reallocs += 1);
        }
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static ALLOC: CountingAlloc = CountingAlloc;

/// Runs `f` with counting enabled on this thread, refusing allocation `fail_at`.
fn measure<T>(fail_at: Option<usize>, f: impl FnOnce() -> T) -> (T, AllocSnapshot) {
    STATS.with(|stats| stats.set(AllocSnapshot::ZERO));
    FAIL_AT.with(|slot| slot.set(fail_at));
    ARMED.with(|armed| armed.set(true));
    let out = f();
    ARMED.with(|armed| armed.set(false));
    FAIL_AT.with(|slot| slot.set(None));
    (out, STATS.with(Cell::get))
}

const INPUT: [f32; 8] = [0.1; 8];
const TARGET: [f32; 3] = [0.0, 1.0, 0.0];

fn warmed_network() -> Network {
    let mut net = Network::new();
    net.resize(8, &[16, 12, 6], 3).unwrap();
    net.random_with_seed(0).unwrap();

    // Warm up so one-time global state (e.g. tracing callsite registration) is
    // not attributed to the measured calls.
    net.forward(&INPUT).unwrap();
    net.backward(&INPUT, &TARGET, 0.1).unwrap();
    net
}

#[test]
fn forward_and_backward_release_every_transient_buffer() {
    if cfg!(feature = "parallel") {
        // rayon's pool allocates job state that outlives a single call.
        return;
    }
    let mut net = warmed_network();

    let (result, fwd) = measure(None, || net.forward(&INPUT).map(|_| ()));
    result.unwrap();
    assert!(fwd.allocs > 0, "forward should use per-call layer buffers");
    assert_eq!(fwd.reallocs, 0);
    assert_eq!(
        fwd.allocs, fwd.deallocs,
        "forward leaked transient buffers: {fwd:?}"
    );

    let (result, bwd) = measure(None, || net.backward(&INPUT, &TARGET, 0.1));
    result.unwrap();
    // One activation and one delta per hidden layer, the activation list, and
    // the output delta.
    assert!(bwd.allocs >= 2 * 3 + 2, "unexpected allocation count: {bwd:?}");
    assert_eq!(bwd.reallocs, 0);
    assert_eq!(
        bwd.allocs, bwd.deallocs,
        "backward leaked transient buffers: {bwd:?}"
    );
}

#[test]
fn allocation_failure_after_output_update_keeps_applied_updates() {
    if cfg!(feature = "parallel") {
        return;
    }
    let mut net = warmed_network();
    let output_before = net.output_layer().weights().to_vec();
    let hidden_before: Vec<Vec<f32>> = net
        .hidden_layers()
        .iter()
        .map(|layer| layer.weights().to_vec())
        .collect();

    // Before the output layer is updated, backward allocates the activation
    // list, three hidden activations and the output delta. Allocation 5 is the
    // delta of the last hidden layer.
    let (result, stats) = measure(Some(5), || net.backward(&INPUT, &TARGET, 0.1));

    assert!(
        matches!(result, Err(Error::Allocation(_))),
        "expected allocation error, got {result:?}"
    );
    assert_eq!(stats.failed, 1);
    assert_eq!(
        stats.allocs, stats.deallocs,
        "failed backward leaked transient buffers: {stats:?}"
    );

    assert_ne!(net.output_layer().weights(), output_before.as_slice());
    for (layer, before) in net.hidden_layers().iter().zip(&hidden_before) {
        assert_eq!(layer.weights(), before.as_slice());
    }

    // The network is still usable after the failed step.
    net.backward(&INPUT, &TARGET, 0.1).unwrap();
}
