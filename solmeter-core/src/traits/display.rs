//! Character display trait

use crate::error::TransportError;

/// A line-oriented character display (HD44780-style)
///
/// Lines and columns are 0-based. Writes start at the cursor and advance it
/// by one column per character.
pub trait CharacterDisplay {
    /// Blank every cell and return the cursor home
    async fn clear(&mut self) -> Result<(), TransportError>;

    /// Move the cursor; any line other than 0 selects the second line
    async fn set_cursor(&mut self, line: u8, col: u8) -> Result<(), TransportError>;

    /// Write text at the cursor
    ///
    /// Every character is attempted even after a bus failure. The first
    /// failure is returned.
    async fn write(&mut self, text: &str) -> Result<(), TransportError>;

    /// Clear, then write `text` on the first line
    async fn show_message(&mut self, text: &str) -> Result<(), TransportError> {
        self.clear().await?;
        self.set_cursor(0, 0).await?;
        self.write(text).await
    }
}
