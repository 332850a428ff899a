/*!
Bindings to the JavaScript objects living in the page: the SDKs of the
wallets (loaded by the dApp under `window`) and the provider injected by
the browser extensions.
*/

pub mod ethereum;
pub mod intry;
pub mod slide;

pub use self::{ethereum::EthereumProvider, intry::IntrySdk, slide::SlideSdk};
