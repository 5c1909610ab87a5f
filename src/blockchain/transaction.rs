//! Programmable transaction building.
//!
//! # Responsibilities
//! - Collect inputs and commands in the order they are added
//! - Hand out result handles so later commands can consume earlier outputs
//! - Reject arguments that point at inputs or commands that do not exist yet
//! - Produce the wire form (`TransactionData`) once object inputs are resolved
//!
//! # Design Decisions
//! - Wire types derive `Serialize`; enum variant order is the wire order
//! - Validation happens when a command is added, not at submission time
//! - Objects may be added by id and resolved later against the ledger

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::blockchain::type_tag::{is_valid_identifier, TypeTag};
use crate::blockchain::types::{
    blake2b256, ObjectId, ObjectRef, SuiAddress, TransactionDigest,
};

/// Hash salt for transaction digests.
const TRANSACTION_DATA_SALT: &[u8] = b"TransactionData::";

/// Errors raised while composing a transaction.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Argument refers to an input that was never added.
    #[error("input {index} does not exist ({count} inputs added)")]
    UnknownInput { index: u16, count: usize },

    /// Argument refers to a command that is not earlier in the sequence.
    #[error("result {index} does not exist ({count} commands added)")]
    UnknownResult { index: u16, count: usize },

    /// More inputs or commands than the wire format can address.
    #[error("too many {0} in one transaction")]
    TooMany(&'static str),

    /// Malformed `package::module::function` target.
    #[error("invalid move call target: {0}")]
    InvalidTarget(String),

    /// An object added by id was not resolved before building.
    #[error("object input {0} was not resolved")]
    UnresolvedObject(ObjectId),

    /// No commands were added.
    #[error("transaction has no commands")]
    EmptyTransaction,

    /// BCS encoding failed.
    #[error("bcs encoding failed: {0}")]
    Serialize(#[from] bcs::Error),
}

pub type BuilderResult<T> = Result<T, BuilderError>;

/// Reference to a value available to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Argument {
    /// The coin paying for gas.
    GasCoin,
    /// A transaction input.
    Input(u16),
    /// The whole result of an earlier command.
    Result(u16),
    /// One value of a multi-value result of an earlier command.
    NestedResult(u16, u16),
}

/// Handle to the output of a command already added to a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResult(u16);

impl CommandResult {
    /// Index of the producing command.
    pub fn index(self) -> u16 {
        self.0
    }

    /// The `n`-th value returned by the command.
    pub fn nested(self, n: u16) -> Argument {
        Argument::NestedResult(self.0, n)
    }
}

impl From<CommandResult> for Argument {
    fn from(result: CommandResult) -> Self {
        Argument::Result(result.0)
    }
}

/// Object input as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ObjectArg {
    /// Immutable or address-owned object.
    ImmOrOwnedObject(ObjectRef),
    /// Shared object, referenced by its initial version.
    SharedObject {
        id: ObjectId,
        initial_shared_version: u64,
        mutable: bool,
    },
}

impl ObjectArg {
    pub fn id(&self) -> ObjectId {
        match self {
            ObjectArg::ImmOrOwnedObject((id, _, _)) => *id,
            ObjectArg::SharedObject { id, .. } => *id,
        }
    }
}

/// Transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CallArg {
    /// BCS-encoded value.
    Pure(Vec<u8>),
    /// Object reference.
    Object(ObjectArg),
}

/// Call of a Move entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgrammableMoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

/// One step of a programmable transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
    TransferObjects(Vec<Argument>, Argument),
    SplitCoins(Argument, Vec<Argument>),
}

impl Command {
    fn arguments(&self) -> Vec<Argument> {
        match self {
            Command::MoveCall(call) => call.arguments.clone(),
            Command::TransferObjects(objects, recipient) => {
                let mut args = objects.clone();
                args.push(*recipient);
                args
            }
            Command::SplitCoins(coin, rest) => {
                let mut args = vec![*coin];
                args.extend(rest.iter().copied());
                args
            }
        }
    }
}

/// Fully resolved inputs and commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

/// Gas payment for a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: SuiAddress,
    pub price: u64,
    pub budget: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionExpiration {
    None,
    Epoch(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionDataV1 {
    pub kind: TransactionKind,
    pub sender: SuiAddress,
    pub gas_data: GasData,
    pub expiration: TransactionExpiration,
}

/// The unsigned transaction that is signed and submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransactionData {
    V1(TransactionDataV1),
}

impl TransactionData {
    /// Wrap a programmable transaction paid for by `sender`.
    pub fn new_programmable(
        sender: SuiAddress,
        payment: Vec<ObjectRef>,
        pt: ProgrammableTransaction,
        budget: u64,
        price: u64,
    ) -> Self {
        TransactionData::V1(TransactionDataV1 {
            kind: TransactionKind::ProgrammableTransaction(pt),
            sender,
            gas_data: GasData {
                payment,
                owner: sender,
                price,
                budget,
            },
            expiration: TransactionExpiration::None,
        })
    }

    pub fn sender(&self) -> SuiAddress {
        match self {
            TransactionData::V1(data) => data.sender,
        }
    }

    pub fn gas_data(&self) -> &GasData {
        match self {
            TransactionData::V1(data) => &data.gas_data,
        }
    }

    /// BCS bytes of the transaction.
    pub fn to_bytes(&self) -> BuilderResult<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// Digest the ledger will assign to this transaction.
    pub fn digest(&self) -> BuilderResult<TransactionDigest> {
        let bytes = self.to_bytes()?;
        Ok(TransactionDigest::new(blake2b256(&[
            TRANSACTION_DATA_SALT,
            &bytes,
        ])))
    }
}

/// Target of a move call: `package::module::function`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTarget {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
}

impl MoveTarget {
    pub fn new(package: ObjectId, module: &str, function: &str) -> BuilderResult<Self> {
        if !is_valid_identifier(module) || !is_valid_identifier(function) {
            return Err(BuilderError::InvalidTarget(format!(
                "{}::{}::{}",
                package, module, function
            )));
        }
        Ok(Self {
            package,
            module: module.to_string(),
            function: function.to_string(),
        })
    }
}

impl FromStr for MoveTarget {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split("::").collect();
        let [package, module, function] = parts.as_slice() else {
            return Err(BuilderError::InvalidTarget(s.to_string()));
        };
        let package: ObjectId = package
            .parse()
            .map_err(|_| BuilderError::InvalidTarget(s.to_string()))?;
        Self::new(package, module, function)
    }
}

impl fmt::Display for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

/// Input slot before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BuilderInput {
    Pure(Vec<u8>),
    Object(ObjectArg),
    Unresolved(ObjectId),
}

impl BuilderInput {
    fn object_id(&self) -> Option<ObjectId> {
        match self {
            BuilderInput::Pure(_) => None,
            BuilderInput::Object(arg) => Some(arg.id()),
            BuilderInput::Unresolved(id) => Some(*id),
        }
    }
}

/// Ordered builder for one programmable transaction.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    inputs: Vec<BuilderInput>,
    commands: Vec<Command>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a BCS-encoded literal input.
    pub fn pure<T: Serialize + ?Sized>(&mut self, value: &T) -> BuilderResult<Argument> {
        let bytes = bcs::to_bytes(value)?;
        self.push_input(BuilderInput::Pure(bytes))
    }

    /// Add an object input by id; it is resolved against the ledger before signing.
    pub fn object(&mut self, id: ObjectId) -> BuilderResult<Argument> {
        if let Some(existing) = self.find_object(id) {
            return Ok(existing);
        }
        self.push_input(BuilderInput::Unresolved(id))
    }

    /// Add an object input whose reference is already known.
    pub fn object_arg(&mut self, arg: ObjectArg) -> BuilderResult<Argument> {
        if let Some(Argument::Input(index)) = self.find_object(arg.id()) {
            self.inputs[index as usize] = BuilderInput::Object(arg);
            return Ok(Argument::Input(index));
        }
        self.push_input(BuilderInput::Object(arg))
    }

    /// Append a move call. The handle refers to its return value(s).
    pub fn move_call(
        &mut self,
        target: MoveTarget,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> BuilderResult<CommandResult> {
        self.push_command(Command::MoveCall(Box::new(ProgrammableMoveCall {
            package: target.package,
            module: target.module,
            function: target.function,
            type_arguments,
            arguments,
        })))
    }

    /// Split `amounts` off `coin`; result `n` is the coin for `amounts[n]`.
    pub fn split_coins(
        &mut self,
        coin: Argument,
        amounts: Vec<Argument>,
    ) -> BuilderResult<CommandResult> {
        self.push_command(Command::SplitCoins(coin, amounts))
    }

    /// Transfer `objects` to the address held by `recipient`.
    pub fn transfer_objects(
        &mut self,
        objects: Vec<Argument>,
        recipient: Argument,
    ) -> BuilderResult<CommandResult> {
        self.push_command(Command::TransferObjects(objects, recipient))
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Ids of every object input, resolved or not.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.inputs.iter().filter_map(BuilderInput::object_id).collect()
    }

    /// Ids of object inputs that still need a ledger lookup.
    pub fn unresolved_objects(&self) -> Vec<ObjectId> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                BuilderInput::Unresolved(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Fill in unresolved objects from `lookup` and produce the wire form.
    pub fn resolve<F>(self, lookup: F) -> BuilderResult<ProgrammableTransaction>
    where
        F: Fn(&ObjectId) -> Option<ObjectArg>,
    {
        if self.commands.is_empty() {
            return Err(BuilderError::EmptyTransaction);
        }
        let inputs = self
            .inputs
            .into_iter()
            .map(|input| match input {
                BuilderInput::Pure(bytes) => Ok(CallArg::Pure(bytes)),
                BuilderInput::Object(arg) => Ok(CallArg::Object(arg)),
                BuilderInput::Unresolved(id) => lookup(&id)
                    .map(CallArg::Object)
                    .ok_or(BuilderError::UnresolvedObject(id)),
            })
            .collect::<BuilderResult<Vec<_>>>()?;
        Ok(ProgrammableTransaction {
            inputs,
            commands: self.commands,
        })
    }

    fn find_object(&self, id: ObjectId) -> Option<Argument> {
        self.inputs
            .iter()
            .position(|input| input.object_id() == Some(id))
            .map(|index| Argument::Input(index as u16))
    }

    fn push_input(&mut self, input: BuilderInput) -> BuilderResult<Argument> {
        let index = u16::try_from(self.inputs.len()).map_err(|_| BuilderError::TooMany("inputs"))?;
        self.inputs.push(input);
        Ok(Argument::Input(index))
    }

    fn push_command(&mut self, command: Command) -> BuilderResult<CommandResult> {
        for argument in command.arguments() {
            self.check_argument(argument)?;
        }
        let index =
            u16::try_from(self.commands.len()).map_err(|_| BuilderError::TooMany("commands"))?;
        self.commands.push(command);
        Ok(CommandResult(index))
    }

    fn check_argument(&self, argument: Argument) -> BuilderResult<()> {
        match argument {
            Argument::GasCoin => Ok(()),
            Argument::Input(index) if (index as usize) < self.inputs.len() => Ok(()),
            Argument::Input(index) => Err(BuilderError::UnknownInput {
                index,
                count: self.inputs.len(),
            }),
            Argument::Result(index) | Argument::NestedResult(index, _)
                if (index as usize) < self.commands.len() =>
            {
                Ok(())
            }
            Argument::Result(index) | Argument::NestedResult(index, _) => {
                Err(BuilderError::UnknownResult {
                    index,
                    count: self.commands.len(),
                })
            }
        }
    }
}
