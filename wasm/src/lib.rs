use wasm_bindgen::prelude::*;
use skiprope::Rope as SkipRope;

#[wasm_bindgen]
pub struct Rope(SkipRope);

#[wasm_bindgen]
impl Rope {
    /// Create a new rope, optionally with initial content.
    #[wasm_bindgen(constructor)]
    pub fn new(s: Option<String>) -> Self {
        // Can't use Option<&str> in wasm-bindgen for some reason. It doesn't matter much -
        // the passed string will be heap allocated anyway.

        let mut r = if cfg!(feature = "ddos_protection") {
            // Generating a rope from entropy adds 5kb to the binary size.
            SkipRope::new()
        } else {
            SkipRope::new_with_seed(321)
        };
        if let Some(str) = s {
            r.insert(0, &str);
        }
        Self(r)
    }

    #[wasm_bindgen]
    pub fn from(s: String) -> Self {
        Self::new(Some(s))
    }

    /// Insert new content at the specified position.
    #[wasm_bindgen]
    pub fn insert(&mut self, pos: usize, content: &str) {
        self.0.insert(pos, content);
    }

    /// Remove (splice out) rope content of length del_len at the specified position.
    #[wasm_bindgen]
    pub fn remove(&mut self, pos: usize, del_len: usize) {
        self.0.remove(pos..pos + del_len);
    }

    #[wasm_bindgen(js_name=toString)]
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.0.len_chars()
    }

    /// Length in UTF-16 code units, matching `string.length` in JS.
    #[cfg(feature = "wchar_conversion")]
    #[wasm_bindgen(getter, js_name=wcharLength)]
    pub fn wchar_length(&self) -> usize {
        self.0.len_wchars()
    }

    /// Insert content at a UTF-16 code-unit position (a JS string index).
    #[cfg(feature = "wchar_conversion")]
    #[wasm_bindgen(js_name=insertAtWchar)]
    pub fn insert_at_wchar(&mut self, wchar_pos: usize, content: &str) -> usize {
        self.0.insert_at_wchar(wchar_pos, content)
    }

    /// Remove content addressed by a UTF-16 code-unit range (a JS string
    /// index range).
    #[cfg(feature = "wchar_conversion")]
    #[wasm_bindgen(js_name=removeAtWchar)]
    pub fn remove_at_wchar(&mut self, wchar_pos: usize, del_len: usize) {
        self.0.remove_at_wchar(wchar_pos..wchar_pos + del_len);
    }
}
