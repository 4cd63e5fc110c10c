//! Register state handed to hook callbacks.

/// One 128-bit vector register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Xmm(pub u128);

impl Xmm {
    pub fn f32(&self, lane: usize) -> f32 {
        f32::from_bits((self.0 >> (lane * 32)) as u32)
    }

    pub fn set_f32(&mut self, lane: usize, value: f32) {
        let shift = lane * 32;
        let mask = !(u128::from(u32::MAX) << shift);
        self.0 = (self.0 & mask) | (u128::from(value.to_bits()) << shift);
    }

    pub fn from_f32(lanes: [f32; 4]) -> Self {
        let mut xmm = Self::default();
        for (lane, value) in lanes.into_iter().enumerate() {
            xmm.set_f32(lane, value);
        }
        xmm
    }
}

/// CPU state at the hooked instruction, before it executes.
///
/// Writes to any field are applied to the hooked thread when the callback
/// returns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HookContext {
    pub rax: u64,
    pub rbx: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub rsp: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    pub rflags: u64,
    pub xmm0: Xmm,
    pub xmm1: Xmm,
    pub xmm2: Xmm,
    pub xmm3: Xmm,
}

/// Read a `T` at `base + offset`.
///
/// # Safety
///
/// `base + offset` must be valid for reads of `T`. Alignment is not required.
pub unsafe fn read_at<T: Copy>(base: u64, offset: u64) -> T {
    // SAFETY: upheld by the caller.
    unsafe { std::ptr::read_unaligned(base.wrapping_add(offset) as usize as *const T) }
}

/// Write a `T` at `base + offset`.
///
/// # Safety
///
/// `base + offset` must be valid for writes of `T`. Alignment is not required.
pub unsafe fn write_at<T: Copy>(base: u64, offset: u64, value: T) {
    // SAFETY: upheld by the caller.
    unsafe { std::ptr::write_unaligned(base.wrapping_add(offset) as usize as *mut T, value) }
}
