//////////////////////////////////////////////////////////////////
// schema
//////////////////////////////////////////////////////////////////

/// Every table of the `fin` schema; safe to run against an existing database.
pub(crate) static CREATE_SCHEMA: &str = "
    CREATE SCHEMA IF NOT EXISTS fin;

    CREATE TABLE IF NOT EXISTS fin.exchange (
        symbol      VARCHAR(10) PRIMARY KEY,
        name        VARCHAR(250),
        country     VARCHAR(100) NOT NULL,
        currency    VARCHAR(3) NOT NULL
    );

    CREATE TABLE IF NOT EXISTS fin.company (
        ticker          VARCHAR(10) NOT NULL,
        exchange        VARCHAR(10) NOT NULL REFERENCES fin.exchange (symbol),
        name            VARCHAR(250) NOT NULL,
        sector          VARCHAR(50),
        industry_group  VARCHAR(50),
        PRIMARY KEY (ticker, exchange)
    );

    CREATE TABLE IF NOT EXISTS fin.statement (
        type    VARCHAR(50) PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS fin.line_item (
        id          INT PRIMARY KEY,
        name        VARCHAR(250) NOT NULL UNIQUE,
        income      BOOLEAN,
        cumulative  BOOLEAN
    );

    CREATE TABLE IF NOT EXISTS fin.statement_item (
        statement_type  VARCHAR(50) NOT NULL REFERENCES fin.statement (type),
        line_item_id    INT NOT NULL REFERENCES fin.line_item (id),
        row_num         INT NOT NULL,
        PRIMARY KEY (statement_type, line_item_id)
    );

    CREATE TABLE IF NOT EXISTS fin.statement_fact (
        ticker          VARCHAR(10) NOT NULL,
        period          VARCHAR(10) NOT NULL,
        line_item_id    INT NOT NULL REFERENCES fin.line_item (id),
        date            DATE NOT NULL,
        value           DOUBLE PRECISION,
        PRIMARY KEY (ticker, period, line_item_id, date)
    );
";

//////////////////////////////////////////////////////////////////
// exchanges & companies
//////////////////////////////////////////////////////////////////

pub(crate) static INSERT_EXCHANGE: &str = "
    INSERT INTO fin.exchange (symbol, name, country, currency)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (symbol) DO NOTHING
";

pub(crate) static INSERT_COMPANY: &str = "
    INSERT INTO fin.company (ticker, exchange, name, sector, industry_group)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (ticker, exchange) DO NOTHING
";

//////////////////////////////////////////////////////////////////
// statements
//////////////////////////////////////////////////////////////////

pub(crate) static INSERT_STATEMENT: &str = "
    INSERT INTO fin.statement (type)
    VALUES ($1)
    ON CONFLICT (type) DO NOTHING
";

pub(crate) static SELECT_LINE_ITEMS: &str = "
    SELECT id, name FROM fin.line_item
";

/// Income and cumulative flags are left for manual classification.
pub(crate) static INSERT_LINE_ITEM: &str = "
    INSERT INTO fin.line_item (id, name)
    VALUES ($1, $2)
    ON CONFLICT (id) DO NOTHING
";

pub(crate) static INSERT_STATEMENT_ITEM: &str = "
    INSERT INTO fin.statement_item (statement_type, line_item_id, row_num)
    VALUES ($1, $2, $3)
    ON CONFLICT (statement_type, line_item_id) DO NOTHING
";

/// The latest scrape wins for a fact that is already recorded; annual and interim figures
/// ending on the same date are separate facts.
pub(crate) static UPSERT_FACT: &str = "
    INSERT INTO fin.statement_fact (ticker, period, line_item_id, date, value)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (ticker, period, line_item_id, date) DO UPDATE SET value = EXCLUDED.value
";

pub(crate) static SELECT_STATEMENT: &str = "
    SELECT si.row_num, f.date, li.name, f.value
    FROM fin.statement_fact f
    INNER JOIN fin.line_item li ON li.id = f.line_item_id
    INNER JOIN fin.statement_item si ON si.line_item_id = li.id
    WHERE si.statement_type = $1 AND f.ticker = $2 AND f.period = $3
    ORDER BY si.row_num, f.date DESC
";
