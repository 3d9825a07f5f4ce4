//! JavaScript built-in globals. References to these never become cell inputs.

use std::sync::LazyLock;

use rustc_hash::FxHashSet;

static BUILTINS: LazyLock<FxHashSet<&'static str>> = LazyLock::new(|| {
    [
        // Language
        "undefined", "NaN", "Infinity", "globalThis", "arguments", "eval",
        "Object", "Function", "Array", "String", "Number", "Boolean", "Symbol", "BigInt",
        "Math", "JSON", "Date", "RegExp", "Promise", "Proxy", "Reflect", "Intl",
        "Map", "Set", "WeakMap", "WeakSet", "WeakRef", "FinalizationRegistry",
        "Error", "TypeError", "RangeError", "SyntaxError", "ReferenceError", "EvalError",
        "URIError", "AggregateError",
        "ArrayBuffer", "SharedArrayBuffer", "DataView", "Atomics",
        "Int8Array", "Uint8Array", "Uint8ClampedArray", "Int16Array", "Uint16Array",
        "Int32Array", "Uint32Array", "Float32Array", "Float64Array", "BigInt64Array",
        "BigUint64Array",
        "parseInt", "parseFloat", "isNaN", "isFinite", "encodeURI", "encodeURIComponent",
        "decodeURI", "decodeURIComponent", "escape", "unescape",
        // Host environment
        "window", "self", "document", "navigator", "location", "history", "console",
        "setTimeout", "clearTimeout", "setInterval", "clearInterval",
        "requestAnimationFrame", "cancelAnimationFrame", "requestIdleCallback",
        "queueMicrotask", "structuredClone", "fetch", "atob", "btoa", "crypto",
        "performance", "localStorage", "sessionStorage", "indexedDB",
        "URL", "URLSearchParams", "Blob", "File", "FileReader", "FormData", "Headers",
        "Request", "Response", "TextEncoder", "TextDecoder", "AbortController",
        "AbortSignal", "Event", "EventTarget", "CustomEvent", "MessageChannel",
        "BroadcastChannel", "WebSocket", "Worker", "Image", "Audio", "Node", "Element",
        "HTMLElement", "SVGElement", "DocumentFragment", "MutationObserver",
        "ResizeObserver", "IntersectionObserver", "DOMParser", "XMLHttpRequest",
        "OffscreenCanvas", "ImageData", "Path2D", "CSS", "getComputedStyle",
        "matchMedia", "alert", "confirm", "prompt",
    ]
    .into_iter()
    .collect()
});

/// Whether `name` is provided by the JavaScript environment itself.
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(name)
}
