use hard_xml::{XmlRead, XmlWrite};

/// One named message, e.g. `<string name="ledger_loaded">...</string>`.
#[derive(XmlWrite, XmlRead, PartialEq, Debug, Clone)]
#[xml(tag = "string")]
pub struct StringElement {
    #[xml(attr = "name")]
    pub name: String,
    #[xml(text)]
    pub content: String,
}
