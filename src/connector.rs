use crate::{
    error::{ConnectorError, ProviderError},
    rpc::{self, ChainId, POLYGON_MAINNET, RequestArguments, method},
    sdk::{EventHandler, InitOptions, InjectedTransport, ProviderEvent, WalletSdk},
};
use core::fmt;
use serde_json::Value;
use std::{
    cell::{OnceCell, RefCell},
    rc::Rc,
};

/// Outcome of a query which does not fail: the connector swallows the
/// provider errors but keeps the last one so the caller can tell an
/// empty wallet apart from a broken provider.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Probe<T> {
    Found(T),
    /// the provider answered but with nothing usable
    Empty,
    /// the last attempt failed with this error
    Failed(ConnectorError),
}

impl<T> Probe<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Empty | Self::Failed(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Option<T>, ConnectorError> {
        match self {
            Self::Found(value) => Ok(Some(value)),
            Self::Empty => Ok(None),
            Self::Failed(error) => Err(error),
        }
    }
}

/// Handle on the object currently providing the connection.
pub enum Provider<S: WalletSdk> {
    /// the wallet SDK client, as returned on activation
    Sdk(Rc<S>),
    /// the injected transport the SDK runs over, as reported by its events
    Injected(Rc<S::Transport>),
}

impl<S: WalletSdk> Provider<S> {
    pub fn sdk(&self) -> Option<&Rc<S>> {
        match self {
            Self::Sdk(sdk) => Some(sdk),
            Self::Injected(_) => None,
        }
    }

    pub fn injected(&self) -> Option<&Rc<S::Transport>> {
        match self {
            Self::Sdk(_) => None,
            Self::Injected(transport) => Some(transport),
        }
    }
}

impl<S: WalletSdk> Clone for Provider<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Sdk(sdk) => Self::Sdk(Rc::clone(sdk)),
            Self::Injected(transport) => Self::Injected(Rc::clone(transport)),
        }
    }
}

impl<S: WalletSdk> fmt::Debug for Provider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sdk(_) => write!(f, "Provider::Sdk"),
            Self::Injected(_) => write!(f, "Provider::Injected"),
        }
    }
}

/// Partial update of the connection state, fields left to `None` are
/// unchanged.
pub struct ConnectorUpdate<S: WalletSdk> {
    pub provider: Option<Provider<S>>,
    pub chain_id: Option<ChainId>,
    pub account: Option<String>,
}

impl<S: WalletSdk> Default for ConnectorUpdate<S> {
    fn default() -> Self {
        Self {
            provider: None,
            chain_id: None,
            account: None,
        }
    }
}

impl<S: WalletSdk> Clone for ConnectorUpdate<S> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            chain_id: self.chain_id.clone(),
            account: self.account.clone(),
        }
    }
}

impl<S: WalletSdk> fmt::Debug for ConnectorUpdate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorUpdate")
            .field("provider", &self.provider)
            .field("chain_id", &self.chain_id)
            .field("account", &self.account)
            .finish()
    }
}

/// Event emitted to the host application.
pub enum ConnectorEvent<S: WalletSdk> {
    Update(ConnectorUpdate<S>),
    /// the wallet disconnected, the host should drop the connection
    Deactivate,
}

impl<S: WalletSdk> Clone for ConnectorEvent<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Update(update) => Self::Update(update.clone()),
            Self::Deactivate => Self::Deactivate,
        }
    }
}

impl<S: WalletSdk> fmt::Debug for ConnectorEvent<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update(update) => f.debug_tuple("Update").field(update).finish(),
            Self::Deactivate => write!(f, "Deactivate"),
        }
    }
}

pub type ConnectorListener<S> = Rc<dyn Fn(&ConnectorEvent<S>)>;

/// State shared between the connector and its provider event handlers.
struct Shared<S: WalletSdk> {
    client: OnceCell<Rc<S>>,
    /// set while the handlers are subscribed to the injected transport
    attached: RefCell<Option<Rc<S::Transport>>>,
    listeners: RefCell<Vec<ConnectorListener<S>>>,
}

impl<S: WalletSdk> Shared<S> {
    fn emit(&self, event: ConnectorEvent<S>) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&event);
        }
    }

    fn handle(&self, event: ProviderEvent, payload: Value) {
        tracing::debug!(event = event.name(), %payload, "provider event");

        match event {
            ProviderEvent::ChainChanged | ProviderEvent::NetworkChanged => {
                let Some(chain_id) = ChainId::from_value(&rpc::parse_send_return(payload)) else {
                    tracing::warn!(event = event.name(), "event without a chain id, ignored");
                    return;
                };
                let provider = self.attached.borrow().clone().map(Provider::Injected);
                self.emit(ConnectorEvent::Update(ConnectorUpdate {
                    provider,
                    chain_id: Some(chain_id),
                    account: None,
                }));
            }
            ProviderEvent::AccountsChanged => {
                match rpc::accounts(&rpc::parse_send_return(payload))
                    .into_iter()
                    .next()
                {
                    Some(account) => self.emit(ConnectorEvent::Update(ConnectorUpdate {
                        account: Some(account),
                        ..ConnectorUpdate::default()
                    })),
                    None => self.emit(ConnectorEvent::Deactivate),
                }
            }
            ProviderEvent::Close => self.emit(ConnectorEvent::Deactivate),
        }
    }
}

/// The fallback queries used to resolve the chain id and the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Query {
    ChainId,
    NetVersion,
    /// `net_version` again, unwrapping every nested envelope
    NetVersionUnwrapped,
    Accounts,
    Enable,
    AccountsUnwrapped,
}

impl Query {
    const CHAIN_ID: [Self; 3] = [Self::ChainId, Self::NetVersion, Self::NetVersionUnwrapped];
    const ACCOUNT: [Self; 3] = [Self::Accounts, Self::Enable, Self::AccountsUnwrapped];

    fn label(self) -> &'static str {
        match self {
            Self::ChainId => method::ETH_CHAIN_ID,
            Self::NetVersion => method::NET_VERSION,
            Self::NetVersionUnwrapped => "net_version v2",
            Self::Accounts => method::ETH_ACCOUNTS,
            Self::Enable => "enable",
            Self::AccountsUnwrapped => "eth_accounts v2",
        }
    }

    async fn send<S: WalletSdk>(self, client: &S) -> Result<Value, ProviderError> {
        let response = match self {
            Self::ChainId => {
                client
                    .request(RequestArguments::new(method::ETH_CHAIN_ID))
                    .await?
            }
            Self::NetVersion | Self::NetVersionUnwrapped => {
                client
                    .request(RequestArguments::new(method::NET_VERSION))
                    .await?
            }
            Self::Accounts | Self::AccountsUnwrapped => {
                client
                    .request(RequestArguments::new(method::ETH_ACCOUNTS))
                    .await?
            }
            Self::Enable => client.enable().await?,
        };

        Ok(match self {
            Self::NetVersionUnwrapped | Self::AccountsUnwrapped => rpc::unwrap_envelopes(response),
            _ => rpc::parse_send_return(response),
        })
    }
}

/// Run the queries in order until one of them yields a value.
async fn first_found<S, T>(
    client: &S,
    queries: &[Query],
    extract: impl Fn(&Value) -> Option<T>,
) -> Probe<T>
where
    S: WalletSdk,
{
    let mut outcome = Probe::Empty;

    for &query in queries {
        outcome = match query.send(client).await {
            Ok(response) => match extract(&response) {
                Some(value) => return Probe::Found(value),
                None => {
                    tracing::warn!(query = query.label(), "empty response");
                    Probe::Empty
                }
            },
            Err(error) => {
                tracing::warn!(query = query.label(), %error, "query was unsuccessful");
                Probe::Failed(error.into())
            }
        };
    }

    outcome
}

/// Connector over a wallet SDK.
///
/// The SDK client is created through `factory` the first time it is
/// needed (see [`Connector::initialize`]) and reused afterwards.
pub struct Connector<S: WalletSdk, F> {
    options: InitOptions,
    factory: F,
    supported_chain_ids: Vec<u64>,
    shared: Rc<Shared<S>>,
    handlers: Vec<(ProviderEvent, EventHandler)>,
}

impl<S, F> Connector<S, F>
where
    S: WalletSdk + 'static,
    F: Fn(&InitOptions) -> S,
{
    pub fn new(options: InitOptions, factory: F) -> Self {
        let shared = Rc::new(Shared {
            client: OnceCell::new(),
            attached: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });

        let handlers = ProviderEvent::ALL
            .into_iter()
            .map(|event| {
                let shared = Rc::downgrade(&shared);
                let handler: EventHandler = Rc::new(move |payload: Value| {
                    if let Some(shared) = shared.upgrade() {
                        shared.handle(event, payload);
                    }
                });
                (event, handler)
            })
            .collect();

        Self {
            options,
            factory,
            supported_chain_ids: vec![POLYGON_MAINNET],
            shared,
            handlers,
        }
    }

    #[must_use]
    pub fn with_supported_chain_ids(mut self, chain_ids: impl IntoIterator<Item = u64>) -> Self {
        self.supported_chain_ids = chain_ids.into_iter().collect();
        self
    }

    pub fn supported_chain_ids(&self) -> &[u64] {
        &self.supported_chain_ids
    }

    pub fn is_supported_chain(&self, chain_id: &ChainId) -> bool {
        chain_id
            .as_u64()
            .is_some_and(|id| self.supported_chain_ids.contains(&id))
    }

    pub fn options(&self) -> &InitOptions {
        &self.options
    }

    /// register a listener for the [`ConnectorEvent`]s
    pub fn subscribe(&self, listener: impl Fn(&ConnectorEvent<S>) + 'static) {
        self.shared.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Create and start the SDK client if not done already.
    ///
    /// A client which reports itself as no longer initialized (e.g. after
    /// [`Connector::deactivate`]) is started again, it is not rebuilt. On
    /// failure nothing is kept and the next call tries again.
    pub async fn initialize(&self) -> Result<Rc<S>, ConnectorError> {
        if let Some(client) = self.shared.client.get() {
            let client = Rc::clone(client);
            if !client.is_initialized() {
                tracing::debug!("restarting the wallet SDK");
                client
                    .init(&self.options)
                    .await
                    .map_err(ConnectorError::Initialization)?;
            }
            return Ok(client);
        }

        tracing::debug!("initializing the wallet SDK");
        let client = Rc::new((self.factory)(&self.options));
        client
            .init(&self.options)
            .await
            .map_err(ConnectorError::Initialization)?;

        if let Err(duplicate) = self.shared.client.set(Rc::clone(&client)) {
            tracing::debug!("wallet SDK initialized concurrently, closing the duplicate");
            duplicate.close();
        }

        Ok(self.shared.client.get().map_or(client, Rc::clone))
    }

    /// Request access to the user's accounts.
    ///
    /// Any error other than the user rejecting the request is returned as
    /// is: there is no fallback on activation. If the SDK runs over an
    /// injected transport the connector starts listening to its events.
    pub async fn activate(&self) -> Result<ConnectorUpdate<S>, ConnectorError> {
        let client = self.initialize().await?;

        let response = client.enable().await.map_err(|error| {
            tracing::warn!(%error, "{} was unsuccessful", method::ETH_REQUEST_ACCOUNTS);
            ConnectorError::from(error)
        })?;
        let account = rpc::first_account(&rpc::parse_send_return(response));

        self.attach(&client);

        Ok(ConnectorUpdate {
            provider: Some(Provider::Sdk(client)),
            chain_id: None,
            account,
        })
    }

    fn attach(&self, client: &S) {
        let mut attached = self.shared.attached.borrow_mut();
        if attached.is_some() {
            return;
        }
        let Some(transport) = client.injected_transport() else {
            return;
        };

        for (event, handler) in &self.handlers {
            transport.on(*event, handler);
        }
        *attached = Some(transport);
    }

    /// Close the SDK client and stop listening to the injected transport.
    pub fn deactivate(&self) {
        self.close();

        let transport = self.shared.attached.borrow_mut().take();
        if let Some(transport) = transport {
            for (event, handler) in &self.handlers {
                transport.remove_listener(*event, handler);
            }
            if let Some(client) = self.shared.client.get() {
                client.release_injected_transport();
            }
        }
    }

    /// Close the SDK client, the event listeners are left in place.
    pub fn close(&self) {
        if let Some(client) = self.shared.client.get() {
            client.close();
        }
    }

    /// the SDK client, once initialized
    pub fn provider(&self) -> Option<Rc<S>> {
        self.shared.client.get().cloned()
    }

    /// Resolve the chain id, trying `eth_chainId` then `net_version`.
    pub async fn chain_id(&self) -> Probe<ChainId> {
        let Some(client) = self.provider() else {
            return Probe::Failed(ConnectorError::NotInitialized);
        };

        first_found(&*client, &Query::CHAIN_ID, ChainId::from_value).await
    }

    /// Resolve the primary account, trying `eth_accounts` then asking the
    /// user for access again.
    pub async fn account(&self) -> Probe<String> {
        let Some(client) = self.provider() else {
            return Probe::Failed(ConnectorError::NotInitialized);
        };

        first_found(&*client, &Query::ACCOUNT, rpc::first_account).await
    }

    pub async fn accounts(&self) -> Probe<Vec<String>> {
        let Some(client) = self.provider() else {
            return Probe::Failed(ConnectorError::NotInitialized);
        };

        match client
            .request(RequestArguments::new(method::ETH_ACCOUNTS))
            .await
        {
            Ok(response) => {
                let accounts = rpc::accounts(&rpc::parse_send_return(response));
                if accounts.is_empty() {
                    Probe::Empty
                } else {
                    Probe::Found(accounts)
                }
            }
            Err(error) => Probe::Failed(error.into()),
        }
    }

    /// `true` if the user already granted access to at least one account.
    pub async fn is_authorized(&self) -> bool {
        self.accounts().await.is_found()
    }
}
