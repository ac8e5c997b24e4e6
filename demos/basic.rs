//! Drives a heap over a plain in-memory span, so it runs on any target.

use brkalloc::{BrkAlloc, SliceBreak};

fn main() {
    let arena = Box::leak(vec![0u8; 64 * 1024].into_boxed_slice());
    let mut heap = BrkAlloc::new(SliceBreak::new(arena));

    unsafe {
        let a = heap.allocate(100);
        let b = heap.allocate(300);
        println!("a = {a:p}, b = {b:p}");

        a.write_bytes(0x41, 100);
        heap.free(a);

        // the freed region is recycled for a close-enough request
        let c = heap.allocate(90);
        println!("c = {c:p} (reuses a: {})", c == a);

        let b = heap.reallocate(b, 1000);
        println!("b grown in place or moved: {b:p}");

        let z = heap.zero_allocate(1, 64);
        println!("zeroed: {}", (0..64).all(|i| z.add(i).read() == 0));

        heap.free(b);
        heap.free(c);
        heap.free(z);
    }

    println!("claimed {} bytes in {} extensions", heap.source().claimed(), heap.source().extensions());
}
