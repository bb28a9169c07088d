//! Common test utilities and helpers.
//!
//! `FakeEngine` serves engine-shaped records built in test memory, so the
//! crate's real unsafe conversion code runs without `libgore`. Record
//! allocations are leaked to keep every pointer valid for the whole test
//! process.

#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_ulong};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gorekit::core::{PackageClass, TypeKind};
use gorekit::ffi::abi::{
    RawCompilerVersion, RawFunction, RawMethod, RawMethodType, RawMethodTypes, RawPackage,
    RawPackages, RawType, RawTypes,
};
use gorekit::ffi::Engine;

/// Common test data and constants
pub mod test_data {
    /// Path the reference binary is registered under
    pub const GOLDEN: &str = "/samples/golden";

    /// Build id recorded for the reference binary
    pub const GOLDEN_BUILD_ID: &str =
        "Rf_Xeaqh0-2nBcT3M3Bo/AeXnMyC0JAL6qkwWPrME/ZUMIY0tmnqiZ53yhzUpv/lPbPoWvfWvIg9I0ESJBX";

    pub const SIMPLE_STRUCT_ADDR: u64 = 0x4b0000;
    pub const SIMPLE_PTR_ADDR: u64 = 0x4b0100;
    pub const TREE_A_ADDR: u64 = 0x4c0000;
    pub const TREE_B_ADDR: u64 = 0x4c0100;
}

pub fn cstr(s: &str) -> *const c_char {
    CString::new(s).unwrap().into_raw()
}

pub fn cbytes(bytes: &[u8]) -> *const c_char {
    CString::new(bytes.to_vec()).unwrap().into_raw()
}

pub fn leak<T>(value: T) -> *mut T {
    Box::into_raw(Box::new(value))
}

pub fn leak_array<T>(items: Vec<*mut T>) -> (*mut *mut T, c_ulong) {
    let len = items.len() as c_ulong;
    (Box::leak(items.into_boxed_slice()).as_mut_ptr(), len)
}

pub fn raw_types(items: Vec<*mut RawType>) -> *mut RawTypes {
    let (types, length) = leak_array(items);
    leak(RawTypes { types, length })
}

pub fn raw_type(kind: TypeKind, name: &str, addr: u64) -> RawType {
    RawType {
        kind: kind as u32,
        name: cstr(name),
        addr,
        ptr_resolved: 0,
        package_path: cstr("main"),
        fields: std::ptr::null_mut(),
        field_name: std::ptr::null(),
        field_tag: std::ptr::null(),
        field_anon: 0,
        element: std::ptr::null_mut(),
        length: 0,
        chan_dir: 0,
        key: std::ptr::null_mut(),
        func_args: std::ptr::null_mut(),
        func_returns: std::ptr::null_mut(),
        is_variadic: 0,
        methods: std::ptr::null_mut(),
    }
}

/// Pointer type record resolving to `target`.
pub fn pointer_to(target: *mut RawType, name: &str, addr: u64) -> *mut RawType {
    let mut ptr = raw_type(TypeKind::Ptr, name, addr);
    ptr.element = target;
    ptr.ptr_resolved = unsafe { (*target).addr };
    leak(ptr)
}

/// Field record: a copy of the field type's record carrying the field info,
/// the way the engine reports struct fields.
pub fn field(of: *mut RawType, name: &str, tag: Option<&str>, embedded: bool) -> *mut RawType {
    let mut f = unsafe { *of };
    f.field_name = cstr(name);
    f.field_tag = tag.map(cstr).unwrap_or(std::ptr::null());
    f.field_anon = embedded as c_int;
    leak(f)
}

pub fn raw_methods(methods: Vec<(&str, *mut RawType, u64, u64)>) -> *mut RawMethodTypes {
    let items = methods
        .into_iter()
        .map(|(name, gotype, iface_addr, func_addr)| {
            leak(RawMethodType {
                name: cstr(name),
                gotype,
                iface_addr,
                func_addr,
            })
        })
        .collect();
    let (methods, length) = leak_array(items);
    leak(RawMethodTypes { methods, length })
}

pub fn raw_function(name: &str, offset: u64, end: u64) -> *mut RawFunction {
    leak(RawFunction {
        name: cstr(name),
        src_line_length: 5,
        src_line_start: 20,
        src_line_end: 24,
        offset,
        end,
        file_name: cstr("/build/main.go"),
        package_name: cstr("main"),
    })
}

pub fn raw_package(
    name: &str,
    filepath: &str,
    functions: Vec<*mut RawFunction>,
    methods: Vec<(&str, *mut RawFunction)>,
) -> *mut RawPackage {
    let methods = methods
        .into_iter()
        .map(|(receiver, function)| {
            leak(RawMethod {
                receiver: cstr(receiver),
                function,
            })
        })
        .collect();
    let (functions, num_funcs) = leak_array(functions);
    let (methods, num_meths) = leak_array(methods);
    leak(RawPackage {
        name: cstr(name),
        filepath: cstr(filepath),
        functions,
        methods,
        num_funcs,
        num_meths,
    })
}

pub fn raw_packages(packages: Vec<*mut RawPackage>) -> *mut RawPackages {
    let (packages, length) = leak_array(packages);
    leak(RawPackages { packages, length })
}

/// Records the engine holds for one binary.
#[derive(Clone, Copy)]
pub struct BinaryFixture {
    pub compiler: *mut RawCompilerVersion,
    pub project: *mut RawPackages,
    pub vendor: *mut RawPackages,
    pub std: *mut RawPackages,
    pub unknown: *mut RawPackages,
    pub types: *mut RawTypes,
    pub build_id: *const c_char,
}

// Fixture memory is leaked and never mutated after construction.
unsafe impl Send for BinaryFixture {}
unsafe impl Sync for BinaryFixture {}

impl BinaryFixture {
    pub fn empty() -> Self {
        BinaryFixture {
            compiler: std::ptr::null_mut(),
            project: std::ptr::null_mut(),
            vendor: std::ptr::null_mut(),
            std: std::ptr::null_mut(),
            unknown: std::ptr::null_mut(),
            types: std::ptr::null_mut(),
            build_id: std::ptr::null(),
        }
    }
}

/// In-memory engine keyed by path.
#[derive(Default)]
pub struct FakeEngine {
    binaries: HashMap<String, BinaryFixture>,
    live: Mutex<HashMap<String, bool>>,
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub versions: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, path: &str, fixture: BinaryFixture) -> Self {
        self.binaries.insert(path.to_string(), fixture);
        self
    }

    pub fn into_dyn(self) -> (Arc<FakeEngine>, Arc<dyn Engine>) {
        let engine = Arc::new(self);
        let dynamic: Arc<dyn Engine> = engine.clone();
        (engine, dynamic)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn fixture(&self, path: &CStr) -> BinaryFixture {
        let key = path.to_string_lossy().into_owned();
        let live = self.live.lock().unwrap();
        assert_eq!(
            live.get(&key),
            Some(&true),
            "engine data read for {key} while not open"
        );
        self.binaries[&key]
    }
}

unsafe impl Engine for FakeEngine {
    fn open(&self, path: &CStr) -> c_int {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let key = path.to_string_lossy().into_owned();
        if !self.binaries.contains_key(&key) {
            return 0;
        }
        self.live.lock().unwrap().insert(key, true);
        1
    }

    fn close(&self, path: &CStr) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        let key = path.to_string_lossy().into_owned();
        let was_live = self.live.lock().unwrap().insert(key.clone(), false);
        assert_eq!(was_live, Some(true), "double close of {key}");
    }

    fn set_go_version(&self, path: &CStr, version: &CStr) -> c_int {
        self.fixture(path);
        let version = version.to_string_lossy().into_owned();
        let accepted = version.starts_with("go1.");
        self.versions.lock().unwrap().push(version);
        accepted as c_int
    }

    fn compiler_version(&self, path: &CStr) -> *const RawCompilerVersion {
        self.fixture(path).compiler
    }

    fn packages(&self, path: &CStr, class: PackageClass) -> *const RawPackages {
        let f = self.fixture(path);
        match class {
            PackageClass::Project => f.project,
            PackageClass::Vendor => f.vendor,
            PackageClass::Std => f.std,
            PackageClass::Unknown => f.unknown,
        }
    }

    fn types(&self, path: &CStr) -> *const RawTypes {
        self.fixture(path).types
    }

    fn build_id(&self, path: &CStr) -> *const c_char {
        self.fixture(path).build_id
    }
}

/// Records modelling the reference binary: one `main` package at `/build`
/// with two functions and a `(*simpleStruct).String` method, a
/// self-referential `main.simpleStruct`, a `main.myComplexStruct` built from
/// it, and two mutually recursive tree types.
pub fn golden() -> BinaryFixture {
    let compiler = leak(RawCompilerVersion {
        name: cstr("go1.12"),
        sha: cstr("05e77d41914d247a1e7caf37d7125ccaa5a53505"),
        timestamp: cstr("2019-02-25T23:01:48Z"),
    });

    let main = raw_package(
        "main",
        "/build",
        vec![
            raw_function("main.main", 0x4870a0, 0x487160),
            raw_function("main.init", 0x487160, 0x4871c0),
        ],
        vec![(
            "(*simpleStruct)",
            raw_function("String", 0x487000, 0x4870a0),
        )],
    );
    let errors = raw_package(
        "errors",
        "/go/src/github.com/pkg/errors",
        vec![raw_function("github.com/pkg/errors.New", 0x47f000, 0x47f080)],
        vec![],
    );
    let fmt = raw_package(
        "fmt",
        "/usr/local/go/src/fmt",
        vec![raw_function("fmt.Println", 0x470000, 0x4700a0)],
        vec![(
            "(*pp)",
            raw_function("printArg", 0x471000, 0x471400),
        )],
    );
    let runtime = raw_package(
        "runtime",
        "/usr/local/go/src/runtime",
        vec![raw_function("runtime.main", 0x428000, 0x428300)],
        vec![],
    );
    let typeeq = raw_package(
        "type",
        "",
        vec![raw_function("type..eq.main.simpleStruct", 0x488000, 0x488040)],
        vec![],
    );

    BinaryFixture {
        compiler,
        project: raw_packages(vec![main]),
        vendor: raw_packages(vec![errors]),
        std: raw_packages(vec![fmt, runtime]),
        unknown: raw_packages(vec![typeeq]),
        types: golden_types(),
        build_id: cstr(test_data::GOLDEN_BUILD_ID),
    }
}

fn golden_types() -> *mut RawTypes {
    use test_data::*;

    let int = leak(raw_type(TypeKind::Int, "int", 0x4a0100));
    let string = leak(raw_type(TypeKind::String, "string", 0x4a0200));

    // type simpleStruct struct { A int `json:"a"`; B string; _ int; next *simpleStruct }
    let simple = leak(raw_type(TypeKind::Struct, "main.simpleStruct", SIMPLE_STRUCT_ADDR));
    let simple_ptr = pointer_to(simple, "*main.simpleStruct", SIMPLE_PTR_ADDR);
    let mut stringer = raw_type(TypeKind::Func, "func() string", 0x4a0300);
    stringer.func_args = raw_types(vec![]);
    stringer.func_returns = raw_types(vec![string]);
    let stringer = leak(stringer);
    unsafe {
        (*simple_ptr).methods = raw_methods(vec![("String", stringer, 0x487000, 0x487000)]);
        (*simple).fields = raw_types(vec![
            field(int, "A", Some("json:\"a\""), false),
            field(string, "B", None, false),
            field(int, "", None, false),
            field(simple_ptr, "next", None, false),
        ]);
    }

    let mut map = raw_type(TypeKind::Map, "map[string]*main.simpleStruct", 0x4a0400);
    map.key = string;
    map.element = simple_ptr;
    let map = leak(map);

    let mut ch = raw_type(TypeKind::Chan, "chan<- int", 0x4a0500);
    ch.element = int;
    ch.chan_dir = 2;
    let ch = leak(ch);

    let mut arr = raw_type(TypeKind::Array, "[4]int", 0x4a0600);
    arr.element = int;
    arr.length = 4;
    let arr = leak(arr);

    let mut handler = raw_type(TypeKind::Func, "func(int, ...string)", 0x4a0700);
    handler.func_args = raw_types(vec![int, leak(slice_of(string, "[]string", 0x4a0800))]);
    handler.is_variadic = 1;
    let handler = leak(handler);

    let complex = leak(raw_type(TypeKind::Struct, "main.myComplexStruct", 0x4b0200));
    unsafe {
        (*complex).fields = raw_types(vec![
            field(simple, "simpleStruct", None, true),
            field(map, "M", None, false),
            field(ch, "C", None, false),
            field(arr, "Arr", None, false),
            field(handler, "Handler", Some("json:\"-\""), false),
        ]);
    }

    // type treeA struct { b *treeB }; type treeB struct { a *treeA }
    let tree_a = leak(raw_type(TypeKind::Struct, "main.treeA", TREE_A_ADDR));
    let tree_b = leak(raw_type(TypeKind::Struct, "main.treeB", TREE_B_ADDR));
    let ptr_a = pointer_to(tree_a, "*main.treeA", 0x4c0200);
    let ptr_b = pointer_to(tree_b, "*main.treeB", 0x4c0300);
    unsafe {
        (*tree_a).fields = raw_types(vec![field(ptr_b, "b", None, false)]);
        (*tree_b).fields = raw_types(vec![field(ptr_a, "a", None, false)]);
    }

    let mut stringer_iface = raw_type(TypeKind::Interface, "fmt.Stringer", 0x4a0900);
    stringer_iface.package_path = cstr("fmt");
    stringer_iface.methods = raw_methods(vec![("String", stringer, 0, 0)]);
    let stringer_iface = leak(stringer_iface);

    raw_types(vec![
        int,
        string,
        simple,
        simple_ptr,
        map,
        ch,
        arr,
        complex,
        tree_a,
        tree_b,
        stringer_iface,
        // reported twice
        simple,
    ])
}

fn slice_of(elem: *mut RawType, name: &str, addr: u64) -> RawType {
    let mut slice = raw_type(TypeKind::Slice, name, addr);
    slice.element = elem;
    slice
}

/// A binary whose text fields are not valid UTF-8.
pub fn mangled() -> BinaryFixture {
    let compiler = leak(RawCompilerVersion {
        name: cbytes(&[b'g', b'o', 0xc3, 0x28]),
        sha: std::ptr::null(),
        timestamp: cstr("unknown"),
    });
    let mut t = raw_type(TypeKind::Struct, "main.\u{1}", 0x10);
    t.name = cbytes(&[b'm', b'a', b'i', b'n', b'.', 0xff]);
    BinaryFixture {
        compiler,
        project: raw_packages(vec![raw_package(
            "main",
            "/build",
            vec![leak(RawFunction {
                name: cbytes(&[0xfe, b'f']),
                ..unsafe { *raw_function("", 0, 0) }
            })],
            vec![],
        )]),
        types: raw_types(vec![leak(t)]),
        build_id: cbytes(&[b'i', b'd', 0x80]),
        ..BinaryFixture::empty()
    }
}
