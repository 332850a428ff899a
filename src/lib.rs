/*!

# EVM wallet connectors for the Slide and Intry SDKs

This library is meant to be used by web applications running in the browser
that need their users to connect a wallet through the Slide or the Intry SDK.

## Features

- Lazily create and start the wallet SDK
- Request access to the user's accounts
- Resolve the chain id and the account, falling back on the legacy queries
- Follow the `window.ethereum` events when the SDK goes through the browser
  extension

## Usage

Create the connector, the SDK is only loaded on activation:

```no_run
use evm_wallet_connector::{InitOptions, slide_connector};

# async fn test() -> anyhow::Result<()> {
let connector = slide_connector(InitOptions::default());
connector.subscribe(|event| println!("{event:?}"));

let update = connector.activate().await?;
if let Some(account) = update.account {
    println!("connected to {account}");
}
# Ok(()) }
```

The queries never fail: they return a [`Probe`] telling apart a value,
an empty answer and a provider failure.

```no_run
# use evm_wallet_connector::{InitOptions, intry_connector};
#
# async fn test() -> anyhow::Result<()> {
# let connector = intry_connector(InitOptions::default());
let chain_id = connector.chain_id().await.into_result()?;
if !chain_id.is_some_and(|id| connector.is_supported_chain(&id)) {
    connector.deactivate();
}
# Ok(()) }
```

Any other SDK can be plugged into the [`Connector`] by implementing
[`WalletSdk`].

*/

mod connector;
pub mod error;
pub mod ffi;
mod injected;
pub mod rpc;
mod sdk;
mod wallet;

pub use self::{
    connector::{Connector, ConnectorEvent, ConnectorListener, ConnectorUpdate, Probe, Provider},
    injected::InjectedEthereum,
    rpc::ChainId,
    sdk::{EventHandler, InitOptions, InjectedTransport, ProviderEvent, WalletSdk, same_handler},
    wallet::{
        IntryClient, IntryConnector, SlideClient, SlideConnector, intry_connector,
        slide_connector,
    },
};
