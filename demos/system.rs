//! Drives a heap over the real program break. Unix only, and the process
//! must not move the break behind the allocator's back, so everything is
//! written through the raw pointers rather than through `println!` buffers
//! holding allocator memory.

#[cfg(unix)]
fn main() {
    use brkalloc::{BrkAlloc, SystemBreak};

    // SAFETY: this demo is the only user of the program break.
    let mut heap = BrkAlloc::new(unsafe { SystemBreak::new() });

    unsafe {
        let p = heap.allocate(4096);
        assert!(!p.is_null());
        p.write_bytes(0x55, 4096);

        let p = heap.reallocate(p, 8192);
        assert!(!p.is_null());
        assert_eq!(p.read(), 0x55);

        heap.free(p);

        println!("break-backed heap ok, p = {p:p}");
    }
}

#[cfg(not(unix))]
fn main() {
    eprintln!("this demo needs a Unix program break; try the `basic` demo instead");
}
