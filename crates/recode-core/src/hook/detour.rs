//! Jmp-back hooks on x86-64 Windows via `ilhook`.

use ilhook::x64::{CallbackOption, HookFlags, HookPoint, HookType, Hooker, Registers};

use super::engine::{Attachment, HookCallback, HookEngine, run_guarded};
use super::{HookContext, Xmm};
use crate::error::{Error, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct IlhookEngine;

impl IlhookEngine {
    pub fn new() -> Self {
        Self
    }
}

/// The trampoline and the callback it points at. `user_data` of the hook is
/// the heap address of `callback`, which never moves.
struct Installed {
    _point: HookPoint,
    _callback: Box<HookCallback>,
}

impl HookEngine for IlhookEngine {
    fn attach(&mut self, address: usize, callback: HookCallback) -> Result<Attachment> {
        let callback = Box::new(callback);
        let user_data = &*callback as *const HookCallback as usize;

        let hooker = Hooker::new(
            address,
            HookType::JmpBack(dispatch),
            CallbackOption::None,
            user_data,
            HookFlags::empty(),
        );
        // SAFETY: the address was validated as a decodable instruction
        // boundary inside an executable image, and `callback` outlives the
        // hook because the returned attachment is never dropped.
        let point = unsafe { hooker.hook() }.map_err(|e| Error::HookInstall {
            address,
            reason: format!("{:?}", e),
        })?;

        Ok(Attachment::new(Installed {
            _point: point,
            _callback: callback,
        }))
    }
}

unsafe extern "win64" fn dispatch(registers: *mut Registers, user_data: usize) {
    // SAFETY: `user_data` is the address of a boxed callback kept alive by its
    // attachment, and ilhook passes a valid register block.
    let (callback, registers) = unsafe { (&*(user_data as *const HookCallback), &mut *registers) };

    let mut ctx = load(registers);
    if run_guarded(callback.as_ref(), &mut ctx) {
        store(&ctx, registers);
    }
}

fn load(r: &Registers) -> HookContext {
    HookContext {
        rax: r.rax,
        rbx: r.rbx,
        rcx: r.rcx,
        rdx: r.rdx,
        rsi: r.rsi,
        rdi: r.rdi,
        rbp: r.rbp,
        rsp: r.rsp,
        r8: r.r8,
        r9: r.r9,
        r10: r.r10,
        r11: r.r11,
        r12: r.r12,
        r13: r.r13,
        r14: r.r14,
        r15: r.r15,
        rflags: r.rflags,
        xmm0: Xmm(r.xmm0),
        xmm1: Xmm(r.xmm1),
        xmm2: Xmm(r.xmm2),
        xmm3: Xmm(r.xmm3),
    }
}

// rsp is not written back; moving the stack under the trampoline is unsupported.
fn store(ctx: &HookContext, r: &mut Registers) {
    r.rax = ctx.rax;
    r.rbx = ctx.rbx;
    r.rcx = ctx.rcx;
    r.rdx = ctx.rdx;
    r.rsi = ctx.rsi;
    r.rdi = ctx.rdi;
    r.rbp = ctx.rbp;
    r.r8 = ctx.r8;
    r.r9 = ctx.r9;
    r.r10 = ctx.r10;
    r.r11 = ctx.r11;
    r.r12 = ctx.r12;
    r.r13 = ctx.r13;
    r.r14 = ctx.r14;
    r.r15 = ctx.r15;
    r.rflags = ctx.rflags;
    r.xmm0 = ctx.xmm0.0;
    r.xmm1 = ctx.xmm1.0;
    r.xmm2 = ctx.xmm2.0;
    r.xmm3 = ctx.xmm3.0;
}
