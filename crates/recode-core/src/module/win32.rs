//! Module enumeration for the current process via PSAPI.

use windows::Win32::Foundation::{HANDLE, HMODULE, MAX_PATH};
use windows::Win32::System::LibraryLoader::{GetModuleFileNameW, GetModuleHandleW};
use windows::Win32::System::ProcessStatus::{EnumProcessModules, GetModuleInformation, MODULEINFO};
use windows::Win32::System::Threading::GetCurrentProcess;
use windows::core::{HSTRING, PCWSTR};

use super::{ModuleInfo, ModuleProvider};
use crate::error::{Error, Result};

/// Room for the module handles of one enumeration
const MAX_MODULES: usize = 1024;

/// Modules of the process this library is loaded into.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Modules;

impl Win32Modules {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleProvider for Win32Modules {
    fn modules(&self) -> Result<Vec<ModuleInfo>> {
        // SAFETY: pseudo handle, valid for the life of the process.
        let process = unsafe { GetCurrentProcess() };

        let mut handles = [HMODULE::default(); MAX_MODULES];
        let mut needed: u32 = 0;
        // SAFETY: the buffer and its byte size describe the same array.
        unsafe {
            EnumProcessModules(
                process,
                handles.as_mut_ptr(),
                std::mem::size_of_val(&handles) as u32,
                &mut needed,
            )
        }
        .map_err(|e| Error::ModuleEnumeration(e.to_string()))?;

        let count = (needed as usize / std::mem::size_of::<HMODULE>()).min(MAX_MODULES);
        let mut modules = Vec::with_capacity(count);
        for &handle in &handles[..count] {
            if handle.is_invalid() {
                continue;
            }
            // A module may unload between enumeration and these queries
            let Some(path) = module_path(handle) else {
                continue;
            };
            let Some(info) = module_information(process, handle) else {
                continue;
            };
            modules.push(ModuleInfo::new(
                path,
                info.lpBaseOfDll as usize,
                info.SizeOfImage as usize,
            ));
        }

        Ok(modules)
    }

    fn resolve(&self, name: &str) -> Result<Option<ModuleInfo>> {
        // SAFETY: GetModuleHandleW does not add a reference; a missing module is an Err.
        let Ok(handle) = (unsafe { GetModuleHandleW(&HSTRING::from(name)) }) else {
            return Ok(None);
        };

        // SAFETY: pseudo handle, valid for the life of the process.
        let process = unsafe { GetCurrentProcess() };
        Ok(module_information(process, handle)
            .map(|info| ModuleInfo::new(name, info.lpBaseOfDll as usize, info.SizeOfImage as usize)))
    }
}

/// The host executable: full path, base address and image size.
pub fn host_module() -> Result<ModuleInfo> {
    // SAFETY: a null name returns the executable's handle.
    let handle = unsafe { GetModuleHandleW(PCWSTR::null()) }
        .map_err(|e| Error::ModuleEnumeration(e.to_string()))?;
    // SAFETY: pseudo handle, valid for the life of the process.
    let process = unsafe { GetCurrentProcess() };

    let path = module_path(handle).unwrap_or_default();
    let info = module_information(process, handle)
        .ok_or_else(|| Error::ModuleEnumeration("GetModuleInformation failed".to_string()))?;
    Ok(ModuleInfo::new(
        path,
        info.lpBaseOfDll as usize,
        info.SizeOfImage as usize,
    ))
}

fn module_path(handle: HMODULE) -> Option<String> {
    let mut buffer = [0u16; MAX_PATH as usize];
    // SAFETY: writes at most buffer.len() UTF-16 units into the buffer.
    let len = unsafe { GetModuleFileNameW(handle, &mut buffer) } as usize;
    (len > 0).then(|| String::from_utf16_lossy(&buffer[..len]))
}

fn module_information(process: HANDLE, handle: HMODULE) -> Option<MODULEINFO> {
    let mut info = MODULEINFO::default();
    // SAFETY: `info` is a properly sized out parameter.
    unsafe {
        GetModuleInformation(
            process,
            handle,
            &mut info,
            std::mem::size_of::<MODULEINFO>() as u32,
        )
    }
    .ok()
    .map(|_| info)
}
