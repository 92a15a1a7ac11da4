//! Processing instructions

use crate::error::DomResult;
use crate::handles::ProcessingInstruction;
use crate::string::DomString;

impl ProcessingInstruction {
    pub fn target(&self) -> DomString {
        self.node_name()
    }

    pub fn data(&self) -> DomString {
        self.read(|d, id| d.char_data(id))
    }

    pub fn set_data(&self, data: &str) -> DomResult<()> {
        let data = DomString::from(data);
        self.write(|d, id| d.set_char_data(id, data))
    }
}
