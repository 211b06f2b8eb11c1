//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements               | Connects to                |
//! |---------------|--------------------------|----------------------------|
//! | `console`     | Display, Keypad, `log`   | stderr / serial console    |
//! | `hardware`    | DoorActuator, Buzzer     | H-bridge + buzzer GPIO     |
//! | `log_sink`    | EventSink                | Serial log output          |
//! | `memory_link` | Link                     | In-memory duplex FIFO      |
//! | `nvs`         | CredentialStore          | NVS / in-memory store      |
//! |               | ConfigPort, StoragePort  |                            |
//! | `uart`        | Link                     | ESP-IDF UART driver        |

pub mod console;
pub mod hardware;
pub mod log_sink;
#[cfg(not(target_os = "espidf"))]
pub mod memory_link;
pub mod nvs;
#[cfg(target_os = "espidf")]
pub mod uart;
